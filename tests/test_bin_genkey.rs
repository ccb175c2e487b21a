mod utils;

use std::path::Path;

use utils::run;

#[test]
fn genkey_prints_a_secret_key() {
    let output = run(&["genkey"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.trim().starts_with("XSK_"));
    // `XSK_` + 106 base32 characters.
    assert_eq!(output.stdout.trim().len(), 4 + 106);
}

#[test]
fn genkey_is_fresh_every_time() {
    let a = run(&["genkey"]);
    let b = run(&["genkey"]);
    assert_ne!(a.stdout, b.stdout);
}

#[test]
fn genkey_json_output() {
    let output = run(&["genkey", "--json"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.contains("\"secret_key\":\"XSK_"));
}

#[test]
fn genkey_with_public_key_file_writes_xpk_file() {
    let tmp = std::env::temp_dir().join(format!("xipher-test-{}.xpk", std::process::id()));
    let _ = std::fs::remove_file(&tmp);

    let tmp_str = tmp.display().to_string();
    let output = run(&["genkey", "--public-key-file", &tmp_str, "--overwrite"]);
    dbg!(&output);

    assert_eq!(output.exit_code, 0);
    assert!(Path::new(&tmp).exists());

    let contents = std::fs::read_to_string(&tmp).unwrap();
    assert!(contents.starts_with("XPK_"));

    let _ = std::fs::remove_file(&tmp);
}

#[test]
fn genkey_with_quantum_safe_public_key_is_larger() {
    let ecc_tmp = std::env::temp_dir().join(format!("xipher-test-ecc-{}.xpk", std::process::id()));
    let pq_tmp = std::env::temp_dir().join(format!("xipher-test-pq-{}.xpk", std::process::id()));
    let _ = std::fs::remove_file(&ecc_tmp);
    let _ = std::fs::remove_file(&pq_tmp);

    let ecc_str = ecc_tmp.display().to_string();
    let pq_str = pq_tmp.display().to_string();

    let ecc_out = run(&["genkey", "--public-key-file", &ecc_str, "--overwrite"]);
    let pq_out = run(&["genkey", "--public-key-file", &pq_str, "--quantum-safe", "--overwrite"]);
    assert_eq!(ecc_out.exit_code, 0);
    assert_eq!(pq_out.exit_code, 0);

    let ecc_len = std::fs::read_to_string(&ecc_tmp).unwrap().trim().len();
    let pq_len = std::fs::read_to_string(&pq_tmp).unwrap().trim().len();
    assert!(pq_len > ecc_len);

    let _ = std::fs::remove_file(&ecc_tmp);
    let _ = std::fs::remove_file(&pq_tmp);
}
