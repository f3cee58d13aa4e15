use std::path::PathBuf;

use snap_core::core_api::{Cell, Engine, ReportTable, Session};
use snap_render::{
    JsonStyle, TextRenderOptions, render_csv, render_json, render_text_table, write_csv,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn session_from_fixtures() -> Session {
    let fixtures = workspace_root().join("tests/fixtures");
    let collection =
        std::fs::read(fixtures.join("CollectionState.json")).expect("fixture should be readable");
    let mastery = std::fs::read(fixtures.join("CharacterMasteryState.json"))
        .expect("fixture should be readable");
    Engine::new()
        .open_bytes(collection, mastery)
        .expect("fixtures should parse")
}

fn report(slug: &str) -> ReportTable {
    session_from_fixtures()
        .report_by_name(slug)
        .expect("report should build")
}

#[test]
fn card_csv_has_header_and_plain_integers() {
    let csv = render_csv(&report("cards-by-boosters")).expect("csv should render");
    assert_eq!(
        csv,
        "CardId,Boosters,MasteryLevel,MasteryXP\n\
         IronMan,12,30,1100\n\
         CaptainAmerica,10,5,90\n\
         Hulk,9,20,400\n\
         Wasp,9,20,0\n\
         Thor,5,30,1200\n\
         AntMan,0,3,50\n\
         Groot,0,1,0\n"
    );
}

#[test]
fn album_csv_renders_percent_with_two_decimals() {
    let csv = render_csv(&report("albums-by-completion")).expect("csv should render");
    assert_eq!(
        csv,
        "AlbumId,AlbumName,TotalVariants,OwnedVariants,NeededForCompletion,CompletionPct\n\
         Album_Iron,Iron Legion,3,3,0,100.00\n\
         Album_Avengers,Avengers Assemble,4,3,1,75.00\n\
         Album_A,Alpha,2,1,1,50.00\n\
         Album_B,Beta,2,1,1,50.00\n\
         Album_Promo,Album_Promo,3,1,2,33.33\n\
         Album_Ten,Deep Cuts,10,3,7,30.00\n\
         Album_Wasp,Wasp Nest,4,1,3,25.00\n"
    );
}

#[test]
fn variant_csv_joins_ids_with_pipes() {
    let csv = render_csv(&report("variants-per-card")).expect("csv should render");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "CardId,VariantCount,OwnedVariantIds");
    assert_eq!(lines[1], "IronMan,3,IronMan_01|IronMan_02|IronMan_03");
    assert_eq!(lines.len(), 6);
}

#[test]
fn blank_cells_render_empty_and_fields_are_quoted_when_needed() {
    let table = ReportTable {
        report: "albums-by-completion".to_string(),
        columns: vec!["AlbumId".to_string(), "AlbumName".to_string()],
        rows: vec![vec![Cell::Empty, Cell::Text("Heroes, Villains".to_string())]],
    };
    let csv = render_csv(&table).expect("csv should render");
    assert_eq!(csv, "AlbumId,AlbumName\n,\"Heroes, Villains\"\n");
}

#[test]
fn csv_output_is_byte_identical_across_runs() {
    let mut first = Vec::new();
    let mut second = Vec::new();
    write_csv(&report("cards-by-mastery-plus-boosters-max-last"), &mut first)
        .expect("first write");
    write_csv(&report("cards-by-mastery-plus-boosters-max-last"), &mut second)
        .expect("second write");
    assert_eq!(first, second);
}

#[test]
fn json_rows_keep_column_order_and_types() {
    let value = render_json(&report("albums-by-completion"), JsonStyle::RowsV1);
    let rows = value.as_array().expect("json should be an array");
    assert_eq!(rows.len(), 7);

    let first = rows[0].as_object().expect("row should be an object");
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "AlbumId",
            "AlbumName",
            "TotalVariants",
            "OwnedVariants",
            "NeededForCompletion",
            "CompletionPct"
        ]
    );
    assert_eq!(first["TotalVariants"].as_u64(), Some(3));
    assert_eq!(first["CompletionPct"].as_f64(), Some(100.0));
    assert_eq!(rows[4]["CompletionPct"].as_f64(), Some(33.33));
}

#[test]
fn text_preview_respects_row_limit() {
    let table = report("cards-by-boosters");
    let text = render_text_table(
        &table,
        TextRenderOptions {
            limit: Some(2),
            ..TextRenderOptions::default()
        },
    );

    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("CardId"));
    assert!(lines[0].contains("MasteryXP"));
    assert!(lines[1].starts_with("------"));
    assert!(lines[2].starts_with("IronMan"));
    assert!(lines[3].starts_with("CaptainAmerica"));
    assert!(!text.contains("Hulk"));
    assert!(text.contains("Previewing 2 of 7 rows."));
}

#[test]
fn text_preview_truncates_wide_cells() {
    let table = report("variants-per-card");
    let text = render_text_table(
        &table,
        TextRenderOptions {
            limit: None,
            max_column_width: 12,
        },
    );
    assert!(text.contains("IronMan_0..."));
    assert!(text.contains("Previewing 5 of 5 rows."));
    for line in text.lines() {
        assert_eq!(line, line.trim_end());
    }
}
