use nhl_etl::apis::gamelog::{game_facts, write_stream, GamelogQuery};
use nhl_etl::pipeline::{run_stage, StageRegistry};
use nhl_etl::protocol::{HeaderMessage, StreamReader};
use nhl_etl::sink::write_csv;
use nhl_etl::types::Record;
use serde_json::json;
use std::collections::HashSet;
use std::io::Cursor;

const TEAM_FACTS: &str = include_str!("resources/team_facts.ndjson");
const PAGE: &str = include_str!("resources/gamelog_2017_18_regular.html");

fn run_named(stage: &str, input: &str) -> String {
    let mut stage = StageRegistry::new().build(stage).unwrap();
    let mut out = Vec::new();
    run_stage(stage.as_mut(), Cursor::new(input), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn read_stream(text: &str) -> (HeaderMessage, Vec<Record>) {
    let mut reader = StreamReader::new(Cursor::new(text.to_string()));
    let header = reader.header().unwrap().cloned().expect("stage output starts with a header");
    let records = reader.collect::<Result<Vec<_>, _>>().unwrap();
    (header, records)
}

#[test]
fn division_stage_emits_each_division_once() {
    let (header, records) = read_stream(&run_named("dim_division", TEAM_FACTS));

    assert_eq!(header.name, "dim_division");
    assert_eq!(header.fields, vec!["name"]);
    let names: Vec<&str> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 3);
    let distinct: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(distinct, HashSet::from(["Metropolitan", "Atlantic", "Central"]));
}

#[test]
fn dedup_is_independent_of_input_order() {
    let reversed: String = TEAM_FACTS.lines().rev().map(|l| format!("{l}\n")).collect();
    assert_eq!(
        run_named("dim_conference", TEAM_FACTS),
        run_named("dim_conference", &reversed)
    );
    let (_, records) = read_stream(&run_named("dim_conference", &reversed));
    assert_eq!(records.len(), 2);
}

#[test]
fn dim_team_records_carry_exactly_the_header_fields() {
    let (header, records) = read_stream(&run_named("dim_team", TEAM_FACTS));
    assert_eq!(records.len(), 5);
    for record in &records {
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, header.fields.iter().collect::<Vec<_>>());
    }
    assert_eq!(records[1]["full_name"], json!("Boston Bruins"));
    assert_eq!(records[1]["first_year_of_play"], json!(1924));
}

#[test]
fn gamelog_to_fact_game_to_csv() {
    let query = GamelogQuery::new("bruins", 2017, 18, "regular").unwrap();
    let mut gamelog = Vec::new();
    write_stream(game_facts(PAGE, &query).unwrap(), &mut gamelog).unwrap();

    let fact_game = run_named("fact_game", &String::from_utf8(gamelog).unwrap());

    let mut csv = Vec::new();
    let rows = write_csv(Cursor::new(fact_game), &mut csv).unwrap();
    assert_eq!(rows, 3);

    let csv = String::from_utf8(csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,hr,dec,os,opp,gf,ga,ppg,pp opp,ppga,ts,shga,sf,sa");
    assert_eq!(lines[1], "2017-10-05T00:00:00,H,W,,NSH,4,3,1,3,0,2,0,33,29");
    assert_eq!(lines[2], "2017-10-07T00:00:00,R,L,OT,COL,4,5,2,4,1,3,0,30,38");
}
