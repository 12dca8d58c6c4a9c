use std::fs;

use owid_explorer::data::{Filter, Region};
use owid_explorer::error::PipelineError;
use owid_explorer::io::{LoadOptions, Source, export_path, load_path};
use owid_explorer::store::Explorer;

const CSV: &str = "\u{feff}ISO_CODE,Continent,Location,Date,New_Cases,Population
FRA,Europe,France,2021-02-01,100,67000000
FRA,Europe,France,2021-02-02,120,67000000
PER,South America,Peru,2021-02-01,40,33000000
OWID_EUR,,Europe,2021-02-01,900,
";

#[test]
fn europe_export_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("owid-covid-data.csv");
    fs::write(&source, CSV).unwrap();

    let loaded = load_path(&source, &LoadOptions::default()).unwrap();
    assert_eq!(loaded.report.rows_kept, 4);
    assert_eq!(
        loaded.dataset.date_bounds().map(|(first, last)| (first.to_string(), last.to_string())),
        Some(("2021-02-01".to_string(), "2021-02-02".to_string()))
    );

    let filter = Filter {
        region: Some(Region::Europe),
        countries_only: true,
        ..Filter::default()
    };
    let subset = loaded.dataset.filter(&filter);
    let out = dir.path().join("europe.csv");
    let columns = vec!["location".to_string(), "date".to_string(), "new_cases".to_string()];
    assert_eq!(export_path(&out, &subset, &columns).unwrap(), 2);

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "location,date,new_cases\nFrance,2021-02-01,100\nFrance,2021-02-02,120\n"
    );
}

#[test]
fn missing_source_is_an_io_error_with_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");

    let err = Explorer::open(&Source::Path(path.clone()), LoadOptions::default()).err().unwrap();
    match err {
        PipelineError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn reload_picks_up_a_rewritten_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, CSV).unwrap();
    let source = Source::Path(path.clone());

    let (explorer, _) = Explorer::open(&source, LoadOptions::default()).unwrap();
    let before = explorer.handle();

    fs::write(&path, format!("{CSV}ITA,Europe,Italy,2021-02-01,80,59000000\n")).unwrap();
    let (after, report) = explorer.reload(&source).unwrap();

    assert_eq!(report.rows_kept, 5);
    assert!(!before.contains_location("Italy"));
    assert!(after.contains_location("Italy"));
    assert_eq!(explorer.handle().generation(), after.generation());
}
