use bojstat_rs::models::{Envelope, Lang, normalize_metadata, normalize_observations};
use bojstat_rs::Error;

#[test]
fn parse_sample_envelope() {
    let sample = r#"
    {
      "STATUS": 200,
      "RESULTSET": [
        {
          "SERIES_CODE": "FXERD01",
          "NAME_OF_TIME_SERIES_J": "東京市場ドル・円スポット 17時時点",
          "NAME_OF_TIME_SERIES": "Yen/U.S.Dollar Spot Rate at 17:00 in JST",
          "UNIT_J": "円",
          "UNIT": "Yen",
          "FREQUENCY": "DAILY",
          "CATEGORY_J": "外国為替相場",
          "CATEGORY": "Foreign Exchange Rates",
          "LAST_UPDATE": "2025-01-07",
          "VALUES": {
            "SURVEY_DATES": ["20250106", "20250107"],
            "VALUES": [157.42, 158.01]
          }
        }
      ],
      "NEXTPOSITION": 251
    }
    "#;

    let env: Envelope = serde_json::from_str(sample).unwrap();
    assert_eq!(env.status, 200);
    assert_eq!(env.next_position.as_deref(), Some("251"));
    assert_eq!(env.result_set.len(), 1);

    let rows = normalize_observations(&env.result_set, Lang::En).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].series_code, "FXERD01");
    assert_eq!(
        rows[0].name.as_deref(),
        Some("Yen/U.S.Dollar Spot Rate at 17:00 in JST")
    );
    assert_eq!(rows[0].unit.as_deref(), Some("Yen"));
    assert_eq!(rows[0].date, "20250106");
    assert_eq!(rows[0].value, Some(157.42));
    assert_eq!(rows[1].date, "20250107");
    assert_eq!(rows[1].value, Some(158.01));
}

#[test]
fn status_accepts_string_or_number() {
    let env: Envelope = serde_json::from_str(r#"{"STATUS":"200","RESULTSET":[]}"#).unwrap();
    assert_eq!(env.status, 200);
    let env: Envelope = serde_json::from_str(r#"{"STATUS":400}"#).unwrap();
    assert_eq!(env.status, 400);
    assert!(env.result_set.is_empty());
}

#[test]
fn next_position_accepts_string_number_or_null() {
    let env: Envelope =
        serde_json::from_str(r#"{"STATUS":200,"RESULTSET":[],"NEXTPOSITION":"501"}"#).unwrap();
    assert_eq!(env.next_position.as_deref(), Some("501"));
    let env: Envelope =
        serde_json::from_str(r#"{"STATUS":200,"RESULTSET":[],"NEXTPOSITION":null}"#).unwrap();
    assert_eq!(env.next_position, None);
    let env: Envelope = serde_json::from_str(r#"{"STATUS":200,"RESULTSET":[]}"#).unwrap();
    assert_eq!(env.next_position, None);
}

#[test]
fn empty_result_set_yields_empty_rows() {
    let rows = normalize_observations(&[], Lang::Jp).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn language_selects_field_set_without_fallback() {
    let block = serde_json::json!({
        "SERIES_CODE": "X1",
        "NAME_OF_TIME_SERIES_J": "日本語名",
        "VALUES": {"SURVEY_DATES": ["202501"], "VALUES": [1.0]}
    });
    let jp = normalize_observations(std::slice::from_ref(&block), Lang::Jp).unwrap();
    assert_eq!(jp[0].name.as_deref(), Some("日本語名"));
    // The English name is absent; it must not fall back to the Japanese one.
    let en = normalize_observations(&[block], Lang::En).unwrap();
    assert_eq!(en[0].name, None);
}

#[test]
fn non_numeric_value_becomes_missing_not_error() {
    let block = serde_json::json!({
        "SERIES_CODE": "X1",
        "VALUES": {"SURVEY_DATES": ["202501", "202502"], "VALUES": ["ND", "1.5"]}
    });
    let rows = normalize_observations(&[block], Lang::Jp).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].value, None);
    assert_eq!(rows[1].value, Some(1.5));
}

#[test]
fn length_mismatch_fails_fast() {
    let block = serde_json::json!({
        "SERIES_CODE": "X1",
        "VALUES": {"SURVEY_DATES": ["202501", "202502"], "VALUES": [1.0]}
    });
    let err = normalize_observations(&[block], Lang::Jp).unwrap_err();
    match err {
        Error::MalformedSeries { code, dates, values } => {
            assert_eq!(code, "X1");
            assert_eq!(dates, 2);
            assert_eq!(values, 1);
        }
        other => panic!("expected MalformedSeries, got {other:?}"),
    }
}

#[test]
fn metadata_rows_are_not_date_expanded() {
    let sample = r#"
    [
      {
        "SERIES_CODE": "FXERD01",
        "NAME_OF_TIME_SERIES_J": "東京市場ドル・円スポット",
        "NAME_OF_TIME_SERIES": "Yen/U.S.Dollar Spot Rate",
        "UNIT": "Yen",
        "FREQUENCY": "DAILY",
        "LAYER1": 1,
        "LAYER2": "2",
        "LAYER3": "",
        "START_OF_THE_TIME_SERIES": "19800104",
        "END_OF_THE_TIME_SERIES": "20250107",
        "LAST_UPDATE": "2025-01-07",
        "NOTES": "Tokyo market"
      },
      {
        "SERIES_CODE": "FXERD02"
      }
    ]
    "#;
    let blocks: Vec<serde_json::Value> = serde_json::from_str(sample).unwrap();
    let rows = normalize_metadata(&blocks, Lang::En).unwrap();
    assert_eq!(rows.len(), 2);

    let r = &rows[0];
    assert_eq!(r.series_code, "FXERD01");
    assert_eq!(r.name.as_deref(), Some("Yen/U.S.Dollar Spot Rate"));
    assert_eq!(r.layer1, Some(1));
    assert_eq!(r.layer2, Some(2));
    assert_eq!(r.layer3, None); // empty string means absent
    assert_eq!(r.layer4, None);
    assert_eq!(r.start.as_deref(), Some("19800104"));
    assert_eq!(r.notes.as_deref(), Some("Tokyo market"));

    // Bare block: every optional field absent.
    let r = &rows[1];
    assert_eq!(r.series_code, "FXERD02");
    assert_eq!(r.name, None);
    assert_eq!(r.layer1, None);
    assert_eq!(r.notes, None);
}

#[test]
fn numeric_survey_dates_keep_textual_form() {
    let block = serde_json::json!({
        "SERIES_CODE": "X1",
        "VALUES": {"SURVEY_DATES": [202501, 202502], "VALUES": [1.0, 2.0]}
    });
    let rows = normalize_observations(&[block], Lang::Jp).unwrap();
    assert_eq!(rows[0].date, "202501");
    assert_eq!(rows[1].date, "202502");
}
