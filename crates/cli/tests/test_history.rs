use pindrop_cli::history::{History, HistoryEntry, MAX_ENTRIES};
use pindrop_core::MediaKind;

fn entry(ts: u64) -> HistoryEntry {
    HistoryEntry {
        url: format!("https://pin.it/{}", ts),
        kind: MediaKind::Image,
        title: None,
        file: None,
        timestamp: ts,
    }
}

#[test]
fn missing_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let history = History::load(&tmp.path().join("history.json"));
    assert!(history.entries().is_empty());
}

#[test]
fn corrupt_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(History::load(&path).entries().is_empty());
}

#[test]
fn record_is_newest_first_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("history.json");

    let mut history = History::load(&path);
    history.record(entry(1)).unwrap();
    history.record(entry(2)).unwrap();

    let reloaded = History::load(&path);
    let stamps: Vec<u64> = reloaded.entries().iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, vec![2, 1]);
}

#[test]
fn record_caps_length() {
    let tmp = tempfile::tempdir().unwrap();
    let mut history = History::load(&tmp.path().join("history.json"));
    for ts in 0..(MAX_ENTRIES as u64 + 5) {
        history.record(entry(ts)).unwrap();
    }
    assert_eq!(history.entries().len(), MAX_ENTRIES);
    assert_eq!(history.entries()[0].timestamp, MAX_ENTRIES as u64 + 4);
}

#[test]
fn remove_and_clear() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.json");
    let mut history = History::load(&path);
    history.record(entry(10)).unwrap();
    history.record(entry(20)).unwrap();

    assert!(history.remove(10).unwrap());
    assert!(!history.remove(10).unwrap());
    assert_eq!(History::load(&path).entries().len(), 1);

    history.clear().unwrap();
    assert!(!path.exists());
    history.clear().unwrap();
}
