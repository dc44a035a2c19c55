//! Integration tests for block-graph extraction and table export.

use untract::model::{Block, BlockGraph, RelationshipType};
use untract::render::{to_csv, OutputRow, RenderOptions};
use untract::{extract_kv, extract_queries, resolve_text, Extraction, LineTerminator};

/// A small form as the analysis service would return it.
const FORM_JSON: &str = r#"{
  "JobStatus": "SUCCEEDED",
  "Blocks": [
    {"BlockType": "PAGE", "Id": "p1", "Page": 1, "Confidence": 100.0,
     "Geometry": {"BoundingBox": {"Left": 0.0, "Top": 0.0, "Width": 1.0, "Height": 1.0}},
     "Relationships": [{"Type": "CHILD", "Ids": ["l1"]}]},
    {"BlockType": "LINE", "Id": "l1", "Page": 1, "Text": "Name: Kim, Min", "Confidence": 99.5,
     "Relationships": [{"Type": "CHILD", "Ids": ["w1", "w2", "w3"]}]},
    {"BlockType": "WORD", "Id": "w1", "Page": 1, "Text": "Name:", "Confidence": 99.1},
    {"BlockType": "WORD", "Id": "w2", "Page": 1, "Text": "Kim,", "Confidence": 98.7},
    {"BlockType": "WORD", "Id": "w3", "Page": 1, "Text": "Min", "Confidence": 98.2},
    {"BlockType": "KEY_VALUE_SET", "Id": "k1", "Page": 1, "EntityTypes": ["KEY"], "Confidence": 90.0,
     "Relationships": [{"Type": "VALUE", "Ids": ["v1"]}, {"Type": "CHILD", "Ids": ["w1"]}]},
    {"BlockType": "KEY_VALUE_SET", "Id": "v1", "Page": 1, "EntityTypes": ["VALUE"], "Confidence": 90.0,
     "Relationships": [{"Type": "CHILD", "Ids": ["w2", "w3"]}]},
    {"BlockType": "KEY_VALUE_SET", "Id": "k2", "Page": 1, "EntityTypes": ["KEY"],
     "Relationships": [{"Type": "VALUE", "Ids": ["v2"]}, {"Type": "CHILD", "Ids": ["w4"]}]},
    {"BlockType": "KEY_VALUE_SET", "Id": "v2", "Page": 1, "EntityTypes": ["VALUE"],
     "Relationships": [{"Type": "CHILD", "Ids": ["s1"]}]},
    {"BlockType": "WORD", "Id": "w4", "Page": 1, "Text": "Married"},
    {"BlockType": "SELECTION_ELEMENT", "Id": "s1", "Page": 1, "SelectionStatus": "SELECTED"},
    {"BlockType": "QUERY", "Id": "q1", "Query": {"Text": "What is the name?", "Alias": "name"},
     "Relationships": [{"Type": "ANSWER", "Ids": ["r1"]}]},
    {"BlockType": "QUERY", "Id": "q2", "Query": {"Text": "What is the fax number?"}},
    {"BlockType": "QUERY_RESULT", "Id": "r1", "Page": 1, "Text": "Kim, Min", "Confidence": 88.0}
  ]
}"#;

fn lf_options() -> RenderOptions {
    RenderOptions::new()
        .with_bom(false)
        .with_line_terminator(LineTerminator::Lf)
}

#[test]
fn test_form_key_values() {
    let graph = BlockGraph::from_json(FORM_JSON).unwrap();
    let (pairs, _) = extract_kv(&graph);

    assert_eq!(pairs.get("Name:").unwrap(), &["Kim, Min".to_string()]);
    assert_eq!(pairs.get("Married").unwrap(), &["X".to_string()]);
}

#[test]
fn test_form_queries() {
    let graph = BlockGraph::from_json(FORM_JSON).unwrap();
    let answers = extract_queries(&graph);

    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].question, "What is the name?");
    assert_eq!(answers[0].answer, "Kim, Min");
    assert_eq!(answers[0].alias.as_deref(), Some("name"));
    assert_eq!(answers[1].answer, "");
}

#[test]
fn test_form_rows() {
    let graph = BlockGraph::from_json(FORM_JSON).unwrap();
    let rows = Extraction::from_graph(&graph).rows();

    // 14 blocks plus one answered query; the unanswered one is dropped.
    assert_eq!(rows.len(), 15);
    assert!(rows[..14].iter().all(|r| !r.is_query()));
    assert!(rows[14].is_query());

    let line = rows[1].cells();
    assert_eq!(line[2], "Name: Kim Min");

    let key = rows[5].cells();
    assert_eq!(key[1], "KEY_VALUE_SET");
    assert_eq!(key[8], "Name:");
    assert_eq!(key[9], "Kim Min");
}

#[test]
fn test_form_csv() {
    let graph = BlockGraph::from_json(FORM_JSON).unwrap();
    let csv = to_csv(&Extraction::from_graph(&graph).rows(), &lf_options());
    let lines: Vec<_> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "Page,BlockType,Text,Confidence,BoundingBox_Left,BoundingBox_Top,\
         BoundingBox_Width,BoundingBox_Height,ExtractedKey,ExtractedValue,\
         QueryQuestion,QueryAnswer"
    );
    assert_eq!(lines[1], "1,PAGE,,100.0,0.0,0.0,1.0,1.0,,,,");
    assert_eq!(lines[6], "1,KEY_VALUE_SET,,90.0,,,,,Name:,Kim Min,,");
    assert_eq!(lines[15], ",,,,,,,,,,What is the name?,\"Kim, Min\"");
    assert_eq!(lines.len(), 16);
}

#[test]
fn test_pipeline_is_idempotent() {
    let first = {
        let graph = BlockGraph::from_json(FORM_JSON).unwrap();
        to_csv(&Extraction::from_graph(&graph).rows(), &RenderOptions::default())
    };
    let second = {
        let graph = BlockGraph::from_json(FORM_JSON).unwrap();
        to_csv(&Extraction::from_graph(&graph).rows(), &RenderOptions::default())
    };
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_dangling_references_degrade() {
    let graph = BlockGraph::new(vec![
        Block::key("k")
            .with_children(["gone", "w"])
            .with_relationship(RelationshipType::Value, ["missing"]),
        Block::query("q", "Anything?").with_relationship(RelationshipType::Answer, ["nowhere"]),
        Block::word("w", "Label"),
    ]);

    assert_eq!(resolve_text(&graph.blocks()[0], &graph), "Label");

    let extraction = Extraction::from_graph(&graph);
    assert_eq!(extraction.key_values.get("Label").unwrap(), &[String::new()]);
    assert_eq!(extraction.query_answers[0].answer, "");

    let rows = extraction.rows();
    assert_eq!(rows.len(), 3);
    match &rows[0] {
        OutputRow::Element(row) => {
            assert_eq!(row.extracted_key, "Label");
            assert_eq!(row.extracted_value, "");
        }
        other => panic!("expected element row, got {other:?}"),
    }
}

#[test]
fn test_empty_key_text_is_legal() {
    let graph = BlockGraph::new(vec![
        Block::key("K1").with_relationship(RelationshipType::Value, ["V1"]),
        Block::value("V1").with_children(["W1"]),
        Block::word("W1", "Acme"),
    ]);

    let (pairs, _) = extract_kv(&graph);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs.get("").unwrap(), &["Acme".to_string()]);
}

#[test]
fn test_empty_answer_suppressed_in_rows_only() {
    let graph = BlockGraph::new(vec![Block::query("q", "Fax?")]);
    let extraction = Extraction::from_graph(&graph);

    assert_eq!(extraction.query_answers.len(), 1);
    assert!(extraction.rows().iter().all(|r| !r.is_query()));
    assert_eq!(extraction.stats().query_count, 1);
}

#[test]
fn test_no_blocks() {
    let graph = BlockGraph::from_json("[]").unwrap();
    let extraction = Extraction::from_graph(&graph);

    assert!(extraction.key_values.is_empty());
    assert!(extraction.query_answers.is_empty());
    assert!(extraction.rows().is_empty());
}
