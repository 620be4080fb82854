//! CLDF Generic dataset: table rows, metadata, and reading a written
//! dataset back.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use multitree_core::model::{LanguageRecord, NodeField, NodeType, RawNode};
use multitree_graph::{read_nexus, NewickNode};

use crate::corpus::CorpusTree;
use crate::error::{ConvertError, ConvertResult};
use crate::sources::Bibliography;

pub const TREES_CSV: &str = "trees.csv";
pub const NODES_CSV: &str = "nodes.csv";
pub const LANGUAGES_CSV: &str = "languages.csv";
pub const MEDIA_CSV: &str = "media.csv";
pub const TREES_NEX: &str = "trees.nex";
pub const SOURCES_BIB: &str = "sources.bib";
pub const METADATA_JSON: &str = "Generic-metadata.json";
pub const README_MD: &str = "README.md";

/// Media row id of the combined tree file.
pub const TREES_MEDIA_ID: &str = "trees";

/// Separator of list-valued columns.
pub const LIST_SEPARATOR: &str = ";";

/// List-valued cells, joined with [`LIST_SEPARATOR`].
mod list {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::LIST_SEPARATOR;

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join(LIST_SEPARATOR))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw
            .split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TreeRow {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "Media_ID")]
    pub media_id: String,
    #[serde(with = "list")]
    pub region: Vec<String>,
    #[serde(with = "list")]
    pub source: Vec<String>,
    #[serde(rename = "Node_Metadata", with = "list")]
    pub node_metadata: Vec<String>,
}

impl TreeRow {
    pub const COLUMNS: [&'static str; 7] = [
        "ID",
        "Name",
        "Description",
        "Media_ID",
        "Region",
        "Source",
        "Node_Metadata",
    ];

    /// Row for a retained tree citing `sources`.
    #[must_use]
    pub fn new(tree: &CorpusTree, sources: Vec<String>) -> Self {
        let mut node_metadata: Vec<String> = tree
            .node_metadata
            .iter()
            .map(|f| f.column().to_string())
            .collect();
        node_metadata.sort_unstable();

        let id = tree.id.to_string();
        Self {
            name: id.clone(),
            id,
            description: tree.document.description.clone(),
            media_id: TREES_MEDIA_ID.to_string(),
            region: tree.document.regions.clone(),
            source: sources,
            node_metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Language_ID")]
    pub language_id: String,
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
    #[serde(rename = "Tree_ID")]
    pub tree_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Node_Type")]
    pub node_type: Option<NodeType>,
    #[serde(rename = "Geography")]
    pub geography: Option<String>,
    #[serde(rename = "Alternative_Names")]
    pub alternative_names: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Other_Codes")]
    pub other_codes: Option<String>,
    #[serde(rename = "Start_Date")]
    pub start_date: Option<String>,
    #[serde(rename = "End_Date")]
    pub end_date: Option<String>,
    #[serde(rename = "Confidence")]
    pub confidence: Option<String>,
    #[serde(rename = "Sureness")]
    pub sureness: Option<String>,
}

impl NodeRow {
    pub const COLUMNS: [&'static str; 14] = [
        "ID",
        "Language_ID",
        "Comment",
        "Tree_ID",
        "Name",
        "Node_Type",
        "Geography",
        "Alternative_Names",
        "Status",
        "Other_Codes",
        "Start_Date",
        "End_Date",
        "Confidence",
        "Sureness",
    ];

    #[must_use]
    pub fn new(tree_id: u64, node: &RawNode) -> Self {
        let field = |f: NodeField| node.get(f).map(str::to_string);
        Self {
            id: node.id.clone(),
            language_id: node.language_id.to_string(),
            comment: field(NodeField::Comment),
            tree_id: tree_id.to_string(),
            name: node.name.clone(),
            node_type: node.node_type,
            geography: field(NodeField::Geography),
            alternative_names: field(NodeField::AlternativeNames),
            status: field(NodeField::Status),
            other_codes: field(NodeField::OtherCodes),
            start_date: field(NodeField::StartDate),
            end_date: field(NodeField::EndDate),
            confidence: field(NodeField::Confidence),
            sureness: field(NodeField::Sureness),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageRow {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub glottocode: Option<String>,
}

impl LanguageRow {
    pub const COLUMNS: [&'static str; 5] = ["ID", "Name", "Latitude", "Longitude", "Glottocode"];
}

impl From<&LanguageRecord> for LanguageRow {
    fn from(record: &LanguageRecord) -> Self {
        let m = record.glottolog.as_ref();
        Self {
            id: record.id.to_string(),
            name: record.name().to_string(),
            latitude: m.and_then(|m| m.latitude),
            longitude: m.and_then(|m| m.longitude),
            glottocode: record.glottocode().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Media_Type")]
    pub media_type: String,
    #[serde(rename = "Download_URL")]
    pub download_url: String,
}

impl MediaRow {
    pub const COLUMNS: [&'static str; 3] = ["ID", "Media_Type", "Download_URL"];

    /// The single media row pointing at the combined NEXUS file.
    #[must_use]
    pub fn trees() -> Self {
        Self {
            id: TREES_MEDIA_ID.to_string(),
            media_type: "text/plain".to_string(),
            download_url: TREES_NEX.to_string(),
        }
    }
}

/// Writes the files of a CLDF dataset into one directory.
#[derive(Debug)]
pub struct CldfWriter {
    dir: PathBuf,
}

impl CldfWriter {
    /// Create the output directory if needed.
    pub fn create(dir: &Path) -> ConvertResult<Self> {
        fs::create_dir_all(dir).map_err(|e| ConvertError::io(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a CSV table. The header is written even when `rows` is empty.
    pub fn write_table<T: Serialize>(
        &self,
        name: &str,
        columns: &[&str],
        rows: &[T],
    ) -> ConvertResult<()> {
        let path = self.dir.join(name);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| ConvertError::io(&path, e))?;
        log::debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    pub fn write_text(&self, name: &str, content: &str) -> ConvertResult<()> {
        let path = self.dir.join(name);
        fs::write(&path, content).map_err(|e| ConvertError::io(&path, e))
    }

    pub fn write_json(&self, name: &str, value: &Value) -> ConvertResult<()> {
        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');
        self.write_text(name, &content)
    }

    pub fn copy_file(&self, from: &Path, name: &str) -> ConvertResult<()> {
        let to = self.dir.join(name);
        fs::copy(from, &to).map_err(|e| ConvertError::io(from, e))?;
        Ok(())
    }
}

fn column(name: &str) -> Value {
    json!({ "name": name, "datatype": "string" })
}

fn term(name: &str) -> String {
    format!("http://cldf.clld.org/v1.0/terms.rdf#{name}")
}

fn id_column() -> Value {
    json!({
        "name": "ID",
        "required": true,
        "propertyUrl": term("id"),
        "datatype": { "base": "string", "format": "[a-zA-Z0-9_\\-]+" }
    })
}

/// `Generic-metadata.json` describing every table written.
#[must_use]
pub fn metadata(with_sources: bool) -> Value {
    let node_types = NodeType::ALL.map(NodeType::as_str).join("|");
    let statuses = [
        "Critically Endangered",
        "Extinct",
        "Extinct but still in Use",
        "Extinct with children",
        "Nearly Extinct",
        "Revived",
        "Vulnerable",
    ]
    .join("|");

    let mut meta = json!({
        "@context": ["http://www.w3.org/ns/csvw", { "@language": "en" }],
        "dc:conformsTo": "http://cldf.clld.org/v1.0/terms.rdf#Generic",
        "dc:title": "MultiTree",
        "dc:license": "https://creativecommons.org/licenses/by/4.0/",
        "rdf:ID": "multitree",
        "rdf:type": "http://www.w3.org/ns/dcat#Distribution",
        "tables": [
            {
                "url": LANGUAGES_CSV,
                "dc:conformsTo": term("LanguageTable"),
                "tableSchema": {
                    "columns": [
                        id_column(),
                        { "name": "Name", "datatype": "string", "propertyUrl": term("name") },
                        {
                            "name": "Latitude",
                            "propertyUrl": term("latitude"),
                            "datatype": { "base": "decimal", "minimum": "-90", "maximum": "90" }
                        },
                        {
                            "name": "Longitude",
                            "propertyUrl": term("longitude"),
                            "datatype": { "base": "decimal", "minimum": "-180", "maximum": "180" }
                        },
                        { "name": "Glottocode", "datatype": "string", "propertyUrl": term("glottocode") }
                    ],
                    "primaryKey": ["ID"]
                }
            },
            {
                "url": TREES_CSV,
                "dc:conformsTo": term("TreeTable"),
                "tableSchema": {
                    "columns": [
                        id_column(),
                        { "name": "Name", "datatype": "string", "propertyUrl": term("name") },
                        { "name": "Description", "datatype": "string", "propertyUrl": term("description") },
                        { "name": "Media_ID", "datatype": "string", "propertyUrl": term("mediaReference") },
                        {
                            "name": "Region",
                            "datatype": "string",
                            "separator": LIST_SEPARATOR,
                            "propertyUrl": "http://purl.org/dc/terms/spatial"
                        },
                        {
                            "name": "Source",
                            "datatype": "string",
                            "separator": LIST_SEPARATOR,
                            "propertyUrl": term("source")
                        },
                        {
                            "name": "Node_Metadata",
                            "datatype": "string",
                            "separator": LIST_SEPARATOR,
                            "dc:description": "Metadata columns populated for at least one node of the tree"
                        }
                    ],
                    "primaryKey": ["ID"],
                    "foreignKeys": [{
                        "columnReference": ["Media_ID"],
                        "reference": { "resource": MEDIA_CSV, "columnReference": ["ID"] }
                    }]
                }
            },
            {
                "url": MEDIA_CSV,
                "dc:conformsTo": term("MediaTable"),
                "tableSchema": {
                    "columns": [
                        id_column(),
                        { "name": "Media_Type", "datatype": "string", "propertyUrl": term("mediaType") },
                        { "name": "Download_URL", "datatype": "anyURI", "propertyUrl": term("downloadUrl") }
                    ],
                    "primaryKey": ["ID"]
                }
            },
            {
                "url": NODES_CSV,
                "dc:description": "Nodes in MultiTree trees are associated with a languoid, \
                    i.e. a language group, language or dialect, and carry metadata.",
                "tableSchema": {
                    "columns": [
                        id_column(),
                        { "name": "Language_ID", "datatype": "string", "propertyUrl": term("languageReference") },
                        { "name": "Comment", "datatype": "string", "propertyUrl": term("comment") },
                        column("Tree_ID"),
                        { "name": "Name", "datatype": "string", "propertyUrl": term("name") },
                        {
                            "name": "Node_Type",
                            "datatype": { "base": "string", "format": node_types }
                        },
                        column("Geography"),
                        column("Alternative_Names"),
                        {
                            "name": "Status",
                            "dc:description": "Endangerment status of the languoid",
                            "datatype": { "base": "string", "format": statuses }
                        },
                        {
                            "name": "Other_Codes",
                            "datatype": "string",
                            "dc:description": "Other language codes assigned to the languoid"
                        },
                        {
                            "name": "Start_Date",
                            "datatype": "string",
                            "dc:description": "Earliest time of documentation"
                        },
                        {
                            "name": "End_Date",
                            "datatype": "string",
                            "dc:description": "Latest time of documentation"
                        },
                        column("Confidence"),
                        column("Sureness")
                    ],
                    "foreignKeys": [
                        {
                            "columnReference": ["Tree_ID"],
                            "reference": { "resource": TREES_CSV, "columnReference": ["ID"] }
                        },
                        {
                            "columnReference": ["Language_ID"],
                            "reference": { "resource": LANGUAGES_CSV, "columnReference": ["ID"] }
                        }
                    ]
                }
            }
        ]
    });
    if with_sources {
        meta["dc:source"] = json!(SOURCES_BIB);
    }
    meta
}

const NOTES: &str = "\
From the former MultiTree website:

### Why MultiTree?

MultiTree provides a unique approach to historical linguistic research, representing the most
complete collection of language relationship hypotheses in a user-friendly, visually-appealing,
and interactive format. Not only is it fun and informative, but it is a useful resource that gathers
scholarly work and makes it accessible to academics and the public alike.

MultiTree is also an innovative tool for typological analysis, especially among lesser-known
languages. It facilitates interdisciplinary collaboration with linguists to reach
more accurate conclusions about human language, culture, and history.


### Disclaimer

The trees in MultiTree are intended to be faithful representations of their sources,
but sometimes it can be difficult to capture a scholar's intentions in a graphical
representation. Whenever possible, editors have added comments to disambiguate or
clarify their interpretations. However, it is always recommended that users refer to the
original source for a better understanding of the scholar's hypothesis.

MultiTree aims to collect as many hypotheses about language relationships as possible
so that users may compare them. Inclusion of a tree does not indicate validity of the
scholar's hypothesis or acceptance by the academic community.

**Regarding contact languages (creoles, pidgins, mixed languages) and language isolates**
Although isolates have no known genetic affiliation, and the origins of contact
languages are heavily contested, they have been included in the MultiTree
database in order to make information about them available to scholars and to accurately
represent whatever hypothesis the original scholar is making. \"Trees\" that include these
languages do not reflect genetic affiliation unless this was the intention of the author.
";

/// Dataset README with table statistics and the MultiTree notes.
#[must_use]
pub fn readme(trees: usize, nodes: usize, languages: usize, matched: usize) -> String {
    format!(
        "# MultiTree\n\n\
         A CLDF dataset of the language relationship hypotheses collected by MultiTree.\n\n\
         ## Statistics\n\n\
         | Table | Rows |\n\
         |:--|--:|\n\
         | {TREES_CSV} | {trees} |\n\
         | {NODES_CSV} | {nodes} |\n\
         | {LANGUAGES_CSV} | {languages} |\n\n\
         {matched} of {languages} languages are linked to Glottolog.\n\n\
         The trees are available in NEXUS format in `{TREES_NEX}`.\n\n\
         ## Description\n\n{NOTES}"
    )
}

/// A written dataset, read back for inspection.
#[derive(Debug)]
pub struct CldfDataset {
    pub dir: PathBuf,
    pub trees: Vec<TreeRow>,
    pub nodes: Vec<NodeRow>,
    pub languages: Vec<LanguageRow>,
    /// Trees from the NEXUS file by tree id.
    pub newick: BTreeMap<String, NewickNode>,
    /// Empty when no bibliography was written.
    pub bibliography: Bibliography,
}

impl CldfDataset {
    pub fn open(dir: &Path) -> ConvertResult<Self> {
        let nexus_path = dir.join(TREES_NEX);
        let nexus = fs::read_to_string(&nexus_path).map_err(|e| ConvertError::io(&nexus_path, e))?;
        let newick = read_nexus(&nexus)?.into_iter().collect();

        let bib_path = dir.join(SOURCES_BIB);
        let bibliography = if bib_path.exists() {
            Bibliography::from_path(&bib_path)?
        } else {
            Bibliography::default()
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            trees: read_table(&dir.join(TREES_CSV))?,
            nodes: read_table(&dir.join(NODES_CSV))?,
            languages: read_table(&dir.join(LANGUAGES_CSV))?,
            newick,
            bibliography,
        })
    }

    #[must_use]
    pub fn tree(&self, id: &str) -> Option<&TreeRow> {
        self.trees.iter().find(|t| t.id == id)
    }

    pub fn nodes_of<'a>(&'a self, tree_id: &'a str) -> impl Iterator<Item = &'a NodeRow> + 'a {
        self.nodes.iter().filter(move |n| n.tree_id == tree_id)
    }

    #[must_use]
    pub fn language(&self, id: &str) -> Option<&LanguageRow> {
        self.languages.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn matched_languages(&self) -> usize {
        self.languages
            .iter()
            .filter(|l| l.glottocode.is_some())
            .count()
    }
}

fn read_table<T: for<'de> Deserialize<'de>>(path: &Path) -> ConvertResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(rows)
}
