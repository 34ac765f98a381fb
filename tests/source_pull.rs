//! End-to-end pull tests against a built source.
//!
//! All timing tests run on a paused tokio clock, so sleeps resolve
//! instantly while `Instant` still observes the scheduled delays.

use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;
use synth_source::config::MAX_DURATION;
use synth_source::record_core::{Operation, PayloadValue, Record};
use synth_source::record_generator::schema::{SCHEMA_FIELDS_KEY, SCHEMA_SUBJECT_KEY};
use synth_source::{
    BurstConfig, CollectionConfig, Config, FormatConfig, Source, SourceBuilder, SourceError,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn raw_config() -> Config {
    Config::single(FormatConfig::raw(&[("id", "int"), ("name", "string")]))
}

fn cancel_after(cancel: &CancellationToken, delay: Duration) {
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.cancel();
    });
}

#[tokio::test(start_paused = true)]
async fn test_record_count_then_blocks_until_cancelled() {
    let config = Config {
        record_count: 3,
        ..raw_config()
    };
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();

    for i in 1..=3u64 {
        let record = source.pull(&cancel).await.unwrap();
        assert_eq!(record.position.as_str(), i.to_string());
    }
    assert!(source.is_exhausted());

    cancel_after(&cancel, Duration::from_secs(5));
    let start = Instant::now();
    let err = source.pull(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(source.metrics().records_produced, 3);
}

#[tokio::test(start_paused = true)]
async fn test_burst_windows() {
    let config = Config {
        burst: BurstConfig {
            sleep_time: ms(100),
            generate_time: ms(150),
        },
        ..raw_config()
    };
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();
    let start = Instant::now();

    // Pulls inside the first generate window return immediately.
    for offset in [0, 50, 100, 125] {
        let target = start + ms(offset);
        tokio::time::advance(target.saturating_duration_since(Instant::now())).await;
        let before = Instant::now();
        source.pull(&cancel).await.unwrap();
        assert!(before.elapsed() < ms(1), "pull at {offset}ms waited");
    }

    // The window closes at 150ms; the next pull sleeps through the sleep window.
    tokio::time::advance((start + ms(150)).saturating_duration_since(Instant::now())).await;
    let before = Instant::now();
    source.pull(&cancel).await.unwrap();
    let waited = before.elapsed();
    assert!(waited >= ms(100) && waited < ms(102), "waited {waited:?}");
    assert_eq!(source.metrics().burst_wait, ms(100));
    assert_eq!(source.metrics().records_produced, 5);
}

#[tokio::test(start_paused = true)]
async fn test_oversized_burst_durations() {
    let yaml = r#"
burst:
  sleep_time: 1s
  generate_time: 18446744073709551615
format:
  type: raw
  options: { id: int }
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert!(matches!(Source::build(config), Err(SourceError::Config(_))));

    // The longest accepted durations build and pull without waiting.
    let config = Config {
        burst: BurstConfig {
            sleep_time: MAX_DURATION,
            generate_time: MAX_DURATION,
        },
        ..raw_config()
    };
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();
    let start = Instant::now();
    source.pull(&cancel).await.unwrap();
    tokio::time::advance(Duration::from_secs(3_600)).await;
    source.pull(&cancel).await.unwrap();
    assert_eq!(source.metrics().burst_wait, Duration::ZERO);
    assert!(start.elapsed() < Duration::from_secs(3_601));
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_spacing() {
    let config = Config {
        rate: 20.0,
        ..raw_config()
    };
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();

    let start = Instant::now();
    source.pull(&cancel).await.unwrap();
    assert!(start.elapsed() < ms(1));

    for i in 1..=5u32 {
        source.pull(&cancel).await.unwrap();
        let elapsed = start.elapsed();
        let expected = ms(50) * i;
        assert!(
            elapsed >= expected - ms(1) && elapsed <= expected + ms(i as u64 + 1),
            "pull {i} at {elapsed:?}"
        );
    }
    assert!(source.metrics().rate_limit_wait >= ms(240));
}

#[tokio::test(start_paused = true)]
async fn test_read_time_acts_as_rate() {
    let config = Config {
        read_time: ms(100),
        ..raw_config()
    };
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();

    let start = Instant::now();
    source.pull(&cancel).await.unwrap();
    source.pull(&cancel).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= ms(99) && elapsed < ms(102), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_rate_wait() {
    let config = Config {
        rate: 1.0,
        ..raw_config()
    };
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();
    source.pull(&cancel).await.unwrap();

    cancel_after(&cancel, ms(100));
    let start = Instant::now();
    let err = source.pull(&cancel).await.unwrap_err();
    assert!(matches!(err, SourceError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(source.metrics().records_produced, 1);
}

#[tokio::test]
async fn test_multiple_collections_have_unique_positions() {
    let config = Config {
        seed: Some(7),
        ..Config::default()
    }
    .with_collection(
        "orders",
        CollectionConfig::new(
            vec![Operation::Create, Operation::Update],
            FormatConfig::raw(&[("id", "int")]),
        ),
    )
    .with_collection(
        "users",
        CollectionConfig::new(
            vec![Operation::Delete],
            FormatConfig::structured(&[("name", "string")]),
        ),
    );
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();

    let mut positions = HashSet::new();
    let mut seen = HashSet::new();
    for _ in 0..500 {
        let record = source.pull(&cancel).await.unwrap();
        assert!(positions.insert(record.position.clone()), "duplicate {}", record.position);

        let collection = record.collection().unwrap().to_string();
        match collection.as_str() {
            "orders" => {
                assert!(record.position.as_str().starts_with('0'));
                assert_ne!(record.operation, Operation::Delete);
                let after = record.payload.after.as_ref().unwrap();
                assert!(after.is_raw());
            }
            "users" => {
                assert!(record.position.as_str().starts_with('1'));
                assert_eq!(record.operation, Operation::Delete);
                assert!(record.payload.after.is_none());
                let before = record.payload.before.as_ref().unwrap();
                assert!(before.as_structured().unwrap().contains_key("name"));
            }
            other => panic!("unexpected collection {other}"),
        }
        assert!(record.payload_matches_operation());
        seen.insert(collection);
    }
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn test_seeded_sources_repeat() {
    fn config() -> Config {
        Config {
            seed: Some(42),
            operations: vec![Operation::Create, Operation::Update, Operation::Delete],
            ..raw_config()
        }
    }

    fn fingerprint(record: &Record) -> (String, Operation, String, Option<PayloadValue>) {
        (
            record.position.as_str().to_string(),
            record.operation,
            record.key.clone(),
            record.payload.after.clone(),
        )
    }

    let cancel = CancellationToken::new();
    let mut a = Source::build(config()).unwrap();
    let mut b = Source::build(config()).unwrap();
    for _ in 0..50 {
        let left = a.pull(&cancel).await.unwrap();
        let right = b.pull(&cancel).await.unwrap();
        assert_eq!(fingerprint(&left), fingerprint(&right));
    }
}

#[tokio::test]
async fn test_file_payload_is_cached() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"fixed\":true}").unwrap();
    file.flush().unwrap();

    let mut source = Source::build(Config::single(FormatConfig::file(file.path()))).unwrap();
    // Contents were read at build time.
    let path = file.path().to_path_buf();
    drop(file);
    assert!(!path.exists());

    let cancel = CancellationToken::new();
    for _ in 0..3 {
        let record = source.pull(&cancel).await.unwrap();
        assert_eq!(record.operation, Operation::Create);
        let after = record.payload.after.unwrap();
        assert_eq!(after.as_raw().unwrap().as_ref(), b"{\"fixed\":true}");
    }
}

#[tokio::test]
async fn test_missing_payload_file() {
    let result = Source::build(Config::single(FormatConfig::file(
        "/definitely/not/here.bin",
    )));
    assert!(matches!(result, Err(SourceError::Generator { .. })));
}

#[tokio::test]
async fn test_invalid_config_reports_all_errors() {
    let config = Config {
        rate: -1.0,
        operations: vec![],
        ..Config::single(FormatConfig::raw(&[("id", "decimal")]))
    };
    let err = match Source::build(config) {
        Err(err) => err.to_string(),
        Ok(_) => panic!("expected invalid configuration"),
    };
    assert!(err.contains("rate"), "{err}");
    assert!(err.contains("at least one operation"), "{err}");
    assert!(err.contains("decimal"), "{err}");
}

#[tokio::test]
async fn test_schema_subject_attached() {
    let mut format = FormatConfig::structured(&[("id", "int"), ("name", "string")]);
    format.schema_subject = Some("v1".to_string());
    let config = Config::default()
        .with_collection("users", CollectionConfig::new(vec![Operation::Create], format));

    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();
    let record = source.pull(&cancel).await.unwrap();

    assert_eq!(record.metadata.attribute(SCHEMA_SUBJECT_KEY), Some("users.v1"));
    assert_eq!(
        record.metadata.attribute(SCHEMA_FIELDS_KEY),
        Some("id:int,name:string")
    );
}

#[tokio::test]
async fn test_injected_post_processor() {
    let mut source = SourceBuilder::new(raw_config())
        .post_processor("", |mut record: Record| {
            record.metadata.set_attribute("tenant", "acme");
            record
        })
        .build()
        .unwrap();
    let cancel = CancellationToken::new();

    let record = source.pull(&cancel).await.unwrap();
    assert_eq!(record.metadata.attribute("tenant"), Some("acme"));
    assert_eq!(record.collection(), None);
}

#[tokio::test]
async fn test_yaml_config() {
    let yaml = r#"
record_count: 2
seed: 1
collections:
  events:
    operations: [snapshot]
    format:
      type: structured
      options:
        id: int
        active: bool
        ttl: duration
        at: time
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let mut source = Source::build(config).unwrap();
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let record = source.pull(&cancel).await.unwrap();
        assert_eq!(record.operation, Operation::Snapshot);
        assert_eq!(record.collection(), Some("events"));
        let data = record.payload.after.as_ref().unwrap().as_structured().unwrap();
        assert!(data["id"].as_i64().unwrap() >= 0);
        assert!(data["active"].as_bool().is_some());
        assert!(data["ttl"].as_duration().unwrap() < Duration::from_secs(1000));
        assert!(data["at"].as_time().is_some());
    }
    assert!(source.is_exhausted());
}
