//! Integration tests for the full raw → CLDF conversion.
//!
//! Each test builds a small corpus, citation table, bibliography and
//! Glottolog snapshot in a temporary directory and runs `make_cldf` on it.

use std::fs;
use std::path::{Path, PathBuf};

use multitree_etl::cldf::CldfDataset;
use multitree_etl::{make_cldf, Config, ConvertError};
use tempfile::TempDir;

const CHADIC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<multitree>
  <tree>
    <description>Chadic according to Newman</description>
    <root>
      <id>1</id>
      <pri-name>Chadic</pri-name>
      <codes>x, chad</codes>
      <node-type>Stock</node-type>
      <region>Africa</region>
      <publications>Newman 1977</publications>
      <children>
        <child>
          <id>2</id>
          <pri-name>Hausa</pri-name>
          <codes>hau</codes>
          <node-type>Language</node-type>
          <status>Vulnerable</status>
        </child>
        <child>
          <id>3</id>
          <pri-name>Bade</pri-name>
          <codes>bde</codes>
          <node-type>Language</node-type>
          <geography>Nigeria</geography>
        </child>
      </children>
    </root>
  </tree>
</multitree>
"#;

const WEST_CHADIC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<multitree>
  <tree>
    <description>West Chadic</description>
    <root>
      <id>1</id>
      <pri-name>West Chadic</pri-name>
      <codes>wch</codes>
      <publications></publications>
      <children>
        <child>
          <id>4</id>
          <pri-name>Haoussa</pri-name>
          <codes>hau</codes>
        </child>
        <child>
          <id>5</id>
          <pri-name>Ngizim</pri-name>
          <codes>ngi</codes>
          <children>
            <child><id>6</id><pri-name>Ngizim Proper</pri-name><codes>ngi.p</codes></child>
          </children>
        </child>
        <child>
          <id>5</id>
          <pri-name>Ngizim</pri-name>
          <codes>ngi</codes>
          <children>
            <child><id>6</id><pri-name>Ngizim Proper</pri-name><codes>ngi.p</codes></child>
          </children>
        </child>
      </children>
    </root>
  </tree>
</multitree>
"#;

const SINGLE: &str = r#"<multitree><tree><description>Isolate</description>
<root><id>1</id><pri-name>Lonely</pri-name><codes>lon</codes></root></tree></multitree>"#;

const GLOTTOLOG: &str = r#"[
  {"id": "haus1257", "name": "Hausa", "latitude": 11.7, "longitude": 8.9,
   "names": {"multitree": ["Hausa"]}, "identifier": {"multitree": "hau"}},
  {"id": "ngiz1242", "name": "Ngizim", "latitude": 12.1, "longitude": 10.9,
   "names": {"multitree": ["Ngizim"]}},
  {"id": "bade1248", "name": "Bade", "names": {"multitree": ["Bade"]}},
  {"id": "bade1249", "name": "Bade-Gashua", "names": {"multitree": ["Bade"]}}
]"#;

const SOURCES_CSV: &str = "Citations,Source\nNewman 1977,newman1977[1-10]\n";

const SOURCES_BIB: &str = r"@book{newman1977,
  author = {Newman, Paul},
  title = {Chadic classification and reconstructions},
  publisher = {Undena},
  year = {1977}
}
";

struct Fixture {
    _dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new(trees: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let raw = root.join("raw");
        let etc = root.join("etc");
        fs::create_dir_all(&raw).unwrap();
        fs::create_dir_all(&etc).unwrap();

        for (name, xml) in trees {
            fs::write(raw.join(name), xml).unwrap();
        }
        fs::write(etc.join("sources.csv"), SOURCES_CSV).unwrap();
        fs::write(etc.join("sources.bib"), SOURCES_BIB).unwrap();
        let glottolog = root.join("glottolog.json");
        fs::write(&glottolog, GLOTTOLOG).unwrap();

        let config = Config {
            raw_dir: raw,
            etc_dir: etc,
            cldf_dir: root.join("cldf"),
            glottolog: Some(glottolog),
            ..Config::default()
        };
        Self { _dir: dir, config }
    }

    fn standard() -> Self {
        Self::new(&[
            ("10.xml", WEST_CHADIC),
            ("2.xml", CHADIC),
            ("3.xml", SINGLE),
            ("notes.xml", "not a tree"),
        ])
    }

    fn cldf(&self) -> &Path {
        &self.config.cldf_dir
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.cldf().join(name)).unwrap()
    }
}

#[test]
fn test_end_to_end_conversion() {
    let fixture = Fixture::standard();
    let summary = make_cldf(&fixture.config).unwrap();

    assert_eq!(summary.trees, 2);
    assert_eq!(summary.nodes, 3 + 4);
    assert_eq!(summary.degenerate, vec![3]);
    assert!(summary.catalogue_used);

    for name in [
        "trees.csv",
        "nodes.csv",
        "languages.csv",
        "media.csv",
        "trees.nex",
        "sources.bib",
        "Generic-metadata.json",
        "README.md",
    ] {
        assert!(fixture.cldf().join(name).exists(), "{name} not written");
    }

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    let chadic = dataset.tree("2").unwrap();
    assert_eq!(chadic.description.as_deref(), Some("Chadic according to Newman"));
    assert_eq!(chadic.region, vec!["Africa"]);
    assert_eq!(chadic.source, vec!["newman1977[1-10]"]);
    assert_eq!(chadic.node_metadata, vec!["Geography", "Status"]);
    assert_eq!(chadic.media_id, "trees");

    let west = dataset.tree("10").unwrap();
    assert!(west.source.is_empty());
    assert!(west.node_metadata.is_empty());
    assert!(dataset.tree("3").is_none());
}

#[test]
fn test_trees_in_numeric_order() {
    let fixture = Fixture::standard();
    make_cldf(&fixture.config).unwrap();

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    let ids: Vec<_> = dataset.trees.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "10"]);

    let nexus = fixture.read("trees.nex");
    let tree_lines: Vec<_> = nexus.lines().filter(|l| l.starts_with("TREE ")).collect();
    assert_eq!(
        tree_lines,
        vec![
            "TREE 2 = [&R] (hau,bde)chad_x;",
            "TREE 10 = [&R] (hau,(ngi-p)ngi)wch;",
        ]
    );
    assert!(nexus.starts_with("#NEXUS\nBEGIN TREES;\n"));
    assert!(nexus.ends_with("END;\n"));
}

#[test]
fn test_newick_labels_match_node_languages() {
    let fixture = Fixture::standard();
    make_cldf(&fixture.config).unwrap();

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    for tree in &dataset.trees {
        let newick = &dataset.newick[&tree.id];
        let labels = newick.names();
        let languages: Vec<_> = dataset
            .nodes_of(&tree.id)
            .map(|n| n.language_id.as_str())
            .collect();
        assert_eq!(labels, languages, "tree {}", tree.id);
    }
}

#[test]
fn test_repeated_subtree_is_dropped() {
    let fixture = Fixture::standard();
    make_cldf(&fixture.config).unwrap();

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    let ids: Vec<_> = dataset.nodes_of("10").map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4", "5", "6"]);
}

#[test]
fn test_language_reconciliation() {
    let fixture = Fixture::standard();
    let summary = make_cldf(&fixture.config).unwrap();

    assert_eq!(summary.reconcile.by_identifier, 1);
    assert_eq!(summary.reconcile.by_name, 1);
    assert_eq!(summary.reconcile.unresolved, 4);
    assert_eq!(summary.reconcile.ambiguous_names, 1);

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    let ids: Vec<_> = dataset.languages.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["chad_x", "hau", "bde", "wch", "ngi", "ngi-p"]);
    assert!(!ids.contains(&"lon"));

    let hausa = dataset.language("hau").unwrap();
    assert_eq!(hausa.name, "Hausa");
    assert_eq!(hausa.glottocode.as_deref(), Some("haus1257"));
    assert_eq!(hausa.latitude, Some(11.7));

    let ngizim = dataset.language("ngi").unwrap();
    assert_eq!(ngizim.glottocode.as_deref(), Some("ngiz1242"));

    let bade = dataset.language("bde").unwrap();
    assert_eq!(bade.name, "bde");
    assert!(bade.glottocode.is_none());

    assert_eq!(dataset.matched_languages(), 2);
}

#[test]
fn test_node_rows_carry_metadata() {
    let fixture = Fixture::standard();
    make_cldf(&fixture.config).unwrap();

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    let hausa = dataset
        .nodes_of("2")
        .find(|n| n.name == "Hausa")
        .unwrap();
    assert_eq!(hausa.status.as_deref(), Some("Vulnerable"));
    assert_eq!(
        hausa.node_type.map(|t| t.as_str()),
        Some("Language")
    );

    let header = fixture.read("nodes.csv");
    assert!(header.starts_with(
        "ID,Language_ID,Comment,Tree_ID,Name,Node_Type,Geography,Alternative_Names,\
         Status,Other_Codes,Start_Date,End_Date,Confidence,Sureness\n"
    ));
}

#[test]
fn test_without_catalogue_all_unresolved() {
    let mut fixture = Fixture::standard();
    fixture.config.glottolog = None;
    let summary = make_cldf(&fixture.config).unwrap();

    assert!(!summary.catalogue_used);
    assert_eq!(summary.reconcile.unresolved, summary.languages);

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    assert!(dataset.languages.iter().all(|l| l.name == l.id));
}

#[test]
fn test_unknown_citation_is_fatal() {
    let xml = CHADIC.replace("Newman 1977", "Nobody 2000");
    let fixture = Fixture::new(&[("1.xml", &xml)]);

    let err = make_cldf(&fixture.config).unwrap_err();
    match err {
        ConvertError::UnknownCitation { path, citation } => {
            assert_eq!(citation, "Nobody 2000");
            assert!(path.ends_with("1.xml"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_without_citation_table_trees_have_no_sources() {
    let xml = CHADIC.replace("Newman 1977", "Nobody 2000");
    let fixture = Fixture::new(&[("1.xml", &xml)]);
    fs::remove_file(fixture.config.etc_dir.join("sources.csv")).unwrap();

    let summary = make_cldf(&fixture.config).unwrap();
    assert_eq!(summary.trees, 1);

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    assert!(dataset.tree("1").unwrap().source.is_empty());
}

#[test]
fn test_inconsistent_duplicate_is_fatal() {
    let xml = WEST_CHADIC.replacen(
        "<children>\n            <child><id>6</id><pri-name>Ngizim Proper</pri-name><codes>ngi.p</codes></child>\n          </children>",
        "",
        1,
    );
    let fixture = Fixture::new(&[("7.xml", &xml)]);

    let err = make_cldf(&fixture.config).unwrap_err();
    assert!(matches!(err, ConvertError::AmbiguousDuplicate { .. }));
    assert!(err.to_string().contains("7.xml"));
}

#[test]
fn test_missing_catalogue_is_fatal() {
    let mut fixture = Fixture::standard();
    fixture.config.glottolog = Some(PathBuf::from("/nonexistent/glottolog.json"));
    assert!(make_cldf(&fixture.config).is_err());
}

#[test]
fn test_bibliography_is_readable_from_dataset() {
    let fixture = Fixture::standard();
    make_cldf(&fixture.config).unwrap();

    let dataset = CldfDataset::open(fixture.cldf()).unwrap();
    let entry = dataset.bibliography.get("newman1977").unwrap();
    assert_eq!(entry.refkey(), "Newman 1977");

    let meta = fixture.read("Generic-metadata.json");
    assert!(meta.contains("\"dc:source\": \"sources.bib\""));
}
