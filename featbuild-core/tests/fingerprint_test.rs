use std::collections::HashMap;
use std::fs;
use std::path::Path;

use featbuild_core::fingerprint::{self, hash_dir, hash_file, Fingerprint};
use featbuild_core::{Error, Feature};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir.path().join("x/Dockerfile"), "FROM scratch\n");
    write(&temp_dir.path().join("x/src/main.rs"), "fn main() {}\n");
    write(&temp_dir.path().join("y/app.txt"), "app\n");
    temp_dir
}

fn feature_for(dir: &TempDir, inputs: &[&str], command: &str) -> Feature {
    Feature::new(
        "feat",
        inputs.iter().map(|i| dir.path().join(i)).collect(),
        command,
        vec![],
    )
}

#[test]
fn test_fingerprint_is_deterministic() {
    let dir = fixture();
    let feature = feature_for(&dir, &["x", "y"], "c1");
    let dep = Fingerprint::new("d".repeat(64));

    let first = fingerprint::compute(&feature, [("base", &dep)]).unwrap();
    let second = fingerprint::compute(&feature, [("base", &dep)]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_single_byte_change_in_input_changes_fingerprint() {
    let dir = fixture();
    let feature = feature_for(&dir, &["x"], "c1");
    let before = fingerprint::compute(&feature, []).unwrap();

    write(&dir.path().join("x/src/main.rs"), "fn main() {}\r");
    let after = fingerprint::compute(&feature, []).unwrap();
    assert_ne!(before, after);
}

#[test]
fn test_command_change_changes_fingerprint() {
    let dir = fixture();
    let a = fingerprint::compute(&feature_for(&dir, &["x"], "c1"), []).unwrap();
    let b = fingerprint::compute(&feature_for(&dir, &["x"], "c2"), []).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_dependency_fingerprint_change_changes_fingerprint() {
    let dir = fixture();
    let feature = feature_for(&dir, &["y"], "c2");
    let h1 = Fingerprint::new("1".repeat(64));
    let h1_prime = Fingerprint::new("2".repeat(64));

    let a = fingerprint::compute(&feature, [("base", &h1)]).unwrap();
    let b = fingerprint::compute(&feature, [("base", &h1_prime)]).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_dependency_order_does_not_matter() {
    let dir = fixture();
    let feature = feature_for(&dir, &["y"], "c2");
    let h_a = Fingerprint::new("a".repeat(64));
    let h_b = Fingerprint::new("b".repeat(64));
    let h_c = Fingerprint::new("c".repeat(64));

    let forward = fingerprint::compute(&feature, [("a", &h_a), ("b", &h_b), ("c", &h_c)]).unwrap();
    let reversed = fingerprint::compute(&feature, [("c", &h_c), ("b", &h_b), ("a", &h_a)]).unwrap();
    assert_eq!(forward, reversed);

    let map: HashMap<&str, &Fingerprint> = [("b", &h_b), ("c", &h_c), ("a", &h_a)].into_iter().collect();
    let from_map = fingerprint::compute(&feature, map).unwrap();
    assert_eq!(forward, from_map);
}

#[test]
fn test_input_order_matters() {
    let dir = fixture();
    let xy = fingerprint::compute(&feature_for(&dir, &["x", "y"], "c1"), []).unwrap();
    let yx = fingerprint::compute(&feature_for(&dir, &["y", "x"], "c1"), []).unwrap();
    assert_ne!(xy, yx);
}

#[test]
fn test_empty_directories_are_ignored() {
    let dir = fixture();
    let before = hash_dir(&dir.path().join("x")).unwrap();

    fs::create_dir_all(dir.path().join("x/empty/nested")).unwrap();
    let after = hash_dir(&dir.path().join("x")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_file_names_only_matter_through_ordering() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("only/a.txt"), "same bytes");
    let before = hash_dir(&dir.path().join("only")).unwrap();

    fs::rename(dir.path().join("only/a.txt"), dir.path().join("only/b.txt")).unwrap();
    let after = hash_dir(&dir.path().join("only")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_directory_digest_folds_sorted_file_digests() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("d/b.txt"), "second");
    write(&dir.path().join("d/a.txt"), "first");

    let first = hash_file(&dir.path().join("d/a.txt")).unwrap();
    let second = hash_file(&dir.path().join("d/b.txt")).unwrap();
    let expected = fingerprint::hash_str(&format!("{}{}", first, second));

    assert_eq!(hash_dir(&dir.path().join("d")).unwrap(), expected);
}

#[test]
fn test_file_input_hashes_as_single_file_directory() {
    let dir = fixture();
    let file = dir.path().join("y/app.txt");
    let expected = fingerprint::hash_str(&hash_file(&file).unwrap());
    assert_eq!(hash_dir(&file).unwrap(), expected);
}

#[test]
fn test_missing_input_is_hash_error() {
    let dir = fixture();
    let feature = feature_for(&dir, &["does-not-exist"], "c1");
    assert!(matches!(
        fingerprint::compute(&feature, []),
        Err(Error::Hash { .. })
    ));
}

#[test]
fn test_dependency_fold_known_digest() {
    let app = Feature::new("app", vec![], "c2", vec!["base".to_string()]);
    let base = Fingerprint::new("a".repeat(64));

    let fp = fingerprint::compute(&app, [("base", &base)]).unwrap();
    assert_eq!(
        fp.as_str(),
        "98107b8c6d99ef909d38adac2be75f9d8942040a7014555a407521c276498005"
    );

    let expected = fingerprint::hash_str(&format!(
        "{}|base{}",
        fingerprint::hash_str("c2"),
        base
    ));
    assert_eq!(fp.as_str(), expected);
}

#[test]
fn test_two_dependencies_known_digest() {
    let app = Feature::new("app", vec![], "c2", vec!["core".into(), "base".into()]);
    let base = Fingerprint::new("a".repeat(64));
    let core = Fingerprint::new("b".repeat(64));

    let fp = fingerprint::compute(&app, [("core", &core), ("base", &base)]).unwrap();
    assert_eq!(
        fp.as_str(),
        "9c02de4db207638ba5a21162ba0c5a4b1185ded39174265024507125ff4f4ded"
    );
}

#[cfg(unix)]
#[test]
fn test_symlinked_file_hashes_target_content() {
    let dir = fixture();
    let input = dir.path().join("linked");
    fs::create_dir_all(&input).unwrap();
    std::os::unix::fs::symlink(dir.path().join("y/app.txt"), input.join("app.txt")).unwrap();

    let linked = hash_dir(&input).unwrap();
    assert_eq!(linked, hash_dir(&dir.path().join("y")).unwrap());

    write(&dir.path().join("y/app.txt"), "changed\n");
    assert_ne!(hash_dir(&input).unwrap(), linked);
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_hash_error() {
    let dir = fixture();
    let input = dir.path().join("broken");
    fs::create_dir_all(&input).unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing.txt"), input.join("gone.txt")).unwrap();

    assert!(matches!(hash_dir(&input), Err(Error::Hash { .. })));
}
