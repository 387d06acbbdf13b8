use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn hamspam_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hamspam").unwrap();
    cmd.env("HAMSPAM_MODEL_DIR", dir.join("model"));
    // Keep any user-level config out of the way
    cmd.env("HAMSPAM_CONFIG", dir.join("absent-config.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

const HAM: &[&str] = &[
    "Are we still meeting for lunch tomorrow",
    "Can you send me the quarterly report",
    "I will call you when I get home",
    "Thanks for the birthday wishes",
    "The project review moved to Thursday",
    "Please pick up milk on the way back",
    "See you at the gym tonight",
    "Did you finish the slides for the meeting",
    "Mum says dinner is at seven",
    "Running late, stuck in traffic",
];

const SPAM: &[&str] = &[
    "Win a free prize now by replying WIN",
    "Congratulations you have won a free cruise call now",
    "URGENT claim your cash reward today",
    "Free ringtones text WIN to 80082 now",
    "You have been selected for a free holiday claim now",
    "Cash prize waiting, call now to claim",
    "Winner! Claim your free mobile upgrade today",
    "Exclusive offer: free entry to win cash",
    "Your account won a reward, reply now to claim",
    "Free gift card winner text CLAIM now",
];

fn write_corpus(dir: &Path) -> PathBuf {
    let data_dir = dir.join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let mut body = String::new();
    for (h, s) in HAM.iter().zip(SPAM) {
        body.push_str(&format!("ham\t{h}\nspam\t{s}\n"));
    }
    // malformed rows are skipped
    body.push_str("spam\n\nunknown\tlabel row\n");
    let path = data_dir.join("spam.csv");
    std::fs::write(&path, body).unwrap();
    path
}

fn train(dir: &Path, data: &Path) {
    hamspam_cmd(dir)
        .arg("train")
        .arg("--data")
        .arg(data)
        .assert()
        .success();
}

/// Train on every record, nothing held out.
fn train_all(dir: &Path, data: &Path) {
    hamspam_cmd(dir)
        .args(["train", "--test-fraction", "0", "--data"])
        .arg(data)
        .assert()
        .success();
}

fn predict(dir: &Path, text: &str) -> String {
    let out = hamspam_cmd(dir)
        .args(["predict", text])
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8(out.stdout).unwrap().trim().to_string()
}

#[test]
fn train_then_predict() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    train_all(dir.path(), &data);

    assert!(dir.path().join("model/vectorizer.json").exists());
    assert!(dir.path().join("model/classifier.json").exists());

    assert_eq!(predict(dir.path(), "Claim your free cash prize now"), "Spam");
    assert_eq!(predict(dir.path(), "Are we still meeting for lunch"), "Ham");
}

#[test]
fn two_line_scenario() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("spam.csv");
    std::fs::write(&data, "ham\tHello there\nspam\tWin a free prize now").unwrap();
    train(dir.path(), &data);

    assert_eq!(predict(dir.path(), "Win a free prize now"), "Spam");
    assert_eq!(predict(dir.path(), "Hello there"), "Ham");
}

#[test]
fn predict_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    train_all(dir.path(), &data);

    hamspam_cmd(dir.path())
        .arg("predict")
        .write_stdin("URGENT: free cash reward, claim now\n")
        .assert()
        .success()
        .stdout("Spam\n");
}

#[test]
fn predict_with_confidence() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    train(dir.path(), &data);

    let out = hamspam_cmd(dir.path())
        .args(["predict", "--confidence", "free prize winner"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let (label, conf) = stdout.trim().split_once('\t').unwrap();
    assert!(label == "Spam" || label == "Ham");
    let conf: f64 = conf.parse().unwrap();
    assert!((0.5..=1.0).contains(&conf));
}

#[test]
fn unseen_vocabulary_still_labeled() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    train(dir.path(), &data);

    let label = predict(dir.path(), "zyxwv qwerty plugh");
    assert!(label == "Spam" || label == "Ham");
}

#[test]
fn predict_without_model_fails() {
    let dir = TempDir::new().unwrap();
    let out = hamspam_cmd(dir.path())
        .args(["predict", "hello"])
        .assert()
        .failure()
        .code(1)
        .stdout("");
    let stderr = String::from_utf8_lossy(&out.get_output().stderr);
    assert!(stderr.contains("missing artifact"));
}

#[test]
fn predict_empty_text_fails() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    train(dir.path(), &data);

    let out = hamspam_cmd(dir.path())
        .arg("predict")
        .write_stdin("   \n")
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr);
    assert!(stderr.contains("no text to classify"));
}

#[test]
fn train_missing_data_fails_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let out = hamspam_cmd(dir.path())
        .args(["train", "--data"])
        .arg(dir.path().join("data/spam.csv"))
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr);
    assert!(stderr.contains("data directory"));
    assert!(!dir.path().join("model").exists());
}

#[test]
fn retrain_is_reproducible() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    let data = write_corpus(dir_a.path());
    train(dir_a.path(), &data);
    train(dir_b.path(), &data);

    let probes = [
        "free lunch tomorrow",
        "call now to win",
        "report for the meeting",
        "cash reward",
        "see you tonight",
    ];
    for probe in probes {
        assert_eq!(predict(dir_a.path(), probe), predict(dir_b.path(), probe), "{probe}");
    }

    let v_a = std::fs::read(dir_a.path().join("model/vectorizer.json")).unwrap();
    let v_b = std::fs::read(dir_b.path().join("model/vectorizer.json")).unwrap();
    assert_eq!(v_a, v_b);
}

#[test]
fn evaluate_prints_report() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    train(dir.path(), &data);

    let out = hamspam_cmd(dir.path())
        .args(["evaluate", "--data"])
        .arg(&data)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Evaluated 20 records"));
    assert!(stdout.contains("precision"));
    assert!(stdout.contains("weighted avg"));
}

#[test]
fn status_describes_artifacts() {
    let dir = TempDir::new().unwrap();

    let out = hamspam_cmd(dir.path()).arg("status").assert().success();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr);
    assert!(stderr.contains("no model"));

    let data = write_corpus(dir.path());
    train(dir.path(), &data);

    let out = hamspam_cmd(dir.path()).arg("status").output().unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("features (1-3 grams"));
    assert!(stderr.contains("alpha 0.1"));
    assert!(stderr.contains("fingerprint"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let data = write_corpus(dir.path());
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[training]\nngram_max = 1\nalpha = 0.5\n").unwrap();

    hamspam_cmd(dir.path())
        .env("HAMSPAM_CONFIG", &config)
        .arg("train")
        .arg("--data")
        .arg(&data)
        .assert()
        .success();

    let out = hamspam_cmd(dir.path()).arg("status").output().unwrap();
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("(1-1 grams"));
    assert!(stderr.contains("alpha 0.5"));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[training]\nalpha = 0.0\n").unwrap();

    let out = hamspam_cmd(dir.path())
        .env("HAMSPAM_CONFIG", &config)
        .arg("status")
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&out.get_output().stderr);
    assert!(stderr.contains("alpha"));
}
