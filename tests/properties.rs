use chrono::{Days, NaiveDate};
use owid_explorer::domain::{Cadence, MetricKind, Observation, RankMode};
use owid_explorer::io::{LoadOptions, export_csv, load_reader};
use owid_explorer::series::{period_end, resample, rolling_average};
use owid_explorer::views::top_n;
use proptest::prelude::*;

const LOCATIONS: [(&str, &str, &str); 6] = [
    ("ESP", "Europe", "Spain"),
    ("ITA", "Europe", "Italy"),
    ("PER", "South America", "Peru"),
    ("OWID_WRL", "", "World"),
    ("OWID_EUR", "", "Europe"),
    ("OWID_HIC", "", "High income"),
];

fn start() -> NaiveDate {
    // A Monday, so weekly periods line up with 7-day chunks.
    NaiveDate::from_ymd_opt(2021, 1, 4).unwrap()
}

fn arb_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (-1.0e6f64..1.0e6).prop_map(Some),
    ]
}

fn arb_count() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        4 => (0u32..10_000).prop_map(|v| Some(f64::from(v))),
    ]
}

/// Raw CSV rows (possibly duplicated keys, any order) over the fixed locations.
fn arb_csv() -> impl Strategy<Value = String> {
    prop::collection::vec((0..LOCATIONS.len(), 0u64..40, arb_value(), arb_value()), 0..80).prop_map(|rows| {
        let mut csv = String::from("iso_code,continent,location,date,new_cases,stringency_index\n");
        for (loc, day, a, b) in rows {
            let (iso, continent, location) = LOCATIONS[loc];
            let date = start() + Days::new(day);
            let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
            csv.push_str(&format!("{iso},{continent},{location},{date},{},{}\n", cell(a), cell(b)));
        }
        csv
    })
}

fn daily(values: &[Option<f64>]) -> Vec<Observation> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Observation::new(start() + Days::new(i as u64), *v))
        .collect()
}

/// Values of a daily series grouped by weekly period end, in order.
fn weeks(series: &[Observation]) -> Vec<Vec<Option<f64>>> {
    let mut out: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
    for obs in series {
        let end = period_end(obs.date, Cadence::Weekly);
        match out.last_mut() {
            Some((last, values)) if *last == end => values.push(obs.value),
            _ => out.push((end, vec![obs.value])),
        }
    }
    out.into_iter().map(|(_, v)| v).collect()
}

proptest! {
    #[test]
    fn loading_is_deterministic_and_idempotent(csv in arb_csv()) {
        let first = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let again = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        prop_assert_eq!(&again, &first);

        let mut exported = Vec::new();
        export_csv(&mut exported, &first, &[]).unwrap();
        let second = load_reader(exported.as_slice(), &LoadOptions::default()).unwrap();

        prop_assert_eq!(second.report.duplicates_replaced, 0);
        prop_assert_eq!(&second.dataset, &first);
    }

    #[test]
    fn rolling_keeps_length_and_first_point(
        values in prop::collection::vec(arb_value(), 1..60),
        window in 0usize..12,
    ) {
        let series = daily(&values);
        let smoothed = rolling_average(&series, window);

        prop_assert_eq!(smoothed.len(), series.len());
        prop_assert_eq!(smoothed[0], series[0]);
    }

    #[test]
    fn weekly_cumulative_is_last_value_of_each_week(values in prop::collection::vec(arb_count(), 1..60)) {
        let series = daily(&values);
        let weekly = resample(&series, MetricKind::Cumulative, Cadence::Weekly);
        let expected: Vec<Option<f64>> = weeks(&series)
            .iter()
            .map(|week| week.iter().rev().find_map(|v| *v))
            .collect();

        prop_assert_eq!(weekly.iter().map(|o| o.value).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn weekly_incremental_is_sum_of_each_week(values in prop::collection::vec(arb_count(), 1..60)) {
        let series = daily(&values);
        let weekly = resample(&series, MetricKind::Incremental, Cadence::Weekly);
        let expected: Vec<Option<f64>> = weeks(&series)
            .iter()
            .map(|week| {
                let present: Vec<f64> = week.iter().filter_map(|v| *v).collect();
                (!present.is_empty()).then(|| present.iter().sum())
            })
            .collect();

        prop_assert_eq!(weekly.iter().map(|o| o.value).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn top_n_never_returns_an_aggregate(csv in arb_csv(), n in 0usize..8, day in 0u64..40) {
        let dataset = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap().dataset;
        let ranked = top_n(&dataset, "new_cases", n, start() + Days::new(day), RankMode::Countries).unwrap();

        prop_assert!(ranked.len() <= n);
        for entry in &ranked {
            prop_assert!(!dataset.is_aggregate(&entry.location), "{} is an aggregate", entry.location);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].value >= pair[1].value);
        }
    }
}
