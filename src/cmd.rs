//! Thin CLI command implementations over the `xipher` library. Errors
//! are printed to stderr and mapped to exit code 1; `--json` switches
//! to a single-line JSON object.

pub mod cli;
mod password;
pub mod ui;

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use xipher::{adapters, envelope, keys::SecretKey};

use cli::{Args, Subject};
use ui::Color;

const CIPHERTEXT_EXTENSION: &str = "xipher";

pub fn genkey(args: &Args) -> Result<(), i32> {
    let secret = SecretKey::new();
    let secret_str = report(secret.to_envelope_string().map_err(|e| e.to_string()), args.json)?;

    let public_written = match &args.public_key_file {
        Some(path) => {
            let public = secret.public_key(args.quantum_safe);
            let pub_path = with_extension(path, "xpk");
            report(
                write_new_file(&pub_path, public.to_envelope_string().as_bytes(), args.overwrite),
                args.json,
            )?;
            Some(pub_path.display().to_string())
        }
        None => None,
    };

    if args.json {
        match public_written {
            Some(path) => println!(
                "{{\"secret_key\":\"{secret_str}\",\"public_key_file\":\"{path}\"}}"
            ),
            None => println!("{{\"secret_key\":\"{secret_str}\"}}"),
        }
    } else {
        println!("{secret_str}");
        if let Some(path) = public_written {
            println!("Public key written to {path}");
        }
    }

    Ok(())
}

pub fn encrypt(args: &Args) -> Result<(), i32> {
    let Some(cli::Command::Encrypt(subject)) = &args.command else {
        unreachable!("cmd::encrypt called without an Encrypt command")
    };

    let key_or_pwd = report(resolve_encrypt_key(args), args.json)?;

    match subject {
        Subject::Text => {
            let plaintext = report(read_text_input(args), args.json)?;
            let (ct_str, _url) = report(
                adapters::encrypt_data(&key_or_pwd, plaintext.as_bytes(), args.compress, None)
                    .map_err(|e| e.to_string()),
                args.json,
            )?;
            emit_text_result("ciphertext", &ct_str, args.json);
        }
        Subject::File => {
            let in_path = report(
                args.file.clone().ok_or_else(|| "Missing --file".to_string()),
                args.json,
            )?;
            let out_path = args
                .out
                .clone()
                .unwrap_or_else(|| format!("{in_path}.{CIPHERTEXT_EXTENSION}"));

            let run = || -> Result<(), String> {
                let mut src = fs::File::open(&in_path).map_err(|e| e.to_string())?;
                let mut dst = open_new_file(&out_path, args.overwrite)?;
                if args.xiphertext {
                    let mut sink = envelope::encoding_writer(&mut dst).map_err(|e| e.to_string())?;
                    adapters::encrypt_stream(&key_or_pwd, &mut sink, &mut src, args.compress, false)
                        .map_err(|e| e.to_string())?;
                    sink.finish().map_err(|e| e.to_string())?;
                } else {
                    adapters::encrypt_stream(&key_or_pwd, &mut dst, &mut src, args.compress, false)
                        .map_err(|e| e.to_string())?;
                }
                Ok(())
            };

            if let Err(err) = run() {
                let _ = fs::remove_file(&out_path);
                return fail(&err, args.json);
            }
            emit_text_result("out", &out_path, args.json);
        }
        Subject::Stream => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut src = stdin.lock();
            let mut dst = stdout.lock();
            report(
                adapters::encrypt_stream(&key_or_pwd, &mut dst, &mut src, args.compress, args.xiphertext)
                    .map_err(|e| e.to_string()),
                args.json,
            )?;
        }
    }

    Ok(())
}

pub fn decrypt(args: &Args) -> Result<(), i32> {
    let Some(cli::Command::Decrypt(subject)) = &args.command else {
        unreachable!("cmd::decrypt called without a Decrypt command")
    };

    let secret_or_pwd = report(resolve_decrypt_secret(), args.json)?;

    match subject {
        Subject::Text => {
            let ct_str = report(
                args.ciphertext
                    .clone()
                    .or_else(|| args.text.clone())
                    .ok_or_else(|| "Missing --ciphertext".to_string()),
                args.json,
            )?;
            let plaintext = report(
                adapters::decrypt_data(&secret_or_pwd, &ct_str)
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string())),
                args.json,
            )?;
            emit_text_result("plaintext", &plaintext, args.json);
        }
        Subject::File => {
            let in_path = report(
                args.file.clone().ok_or_else(|| "Missing --file".to_string()),
                args.json,
            )?;
            let out_path = args.out.clone().unwrap_or_else(|| strip_extension(&in_path, CIPHERTEXT_EXTENSION));

            let run = || -> Result<(), String> {
                let mut src = fs::File::open(&in_path).map_err(|e| e.to_string())?;
                let mut dst = open_new_file(&out_path, args.overwrite)?;
                // `adapters::decrypt_stream` already auto-detects the
                // `XCT_` text envelope; no need to strip it here too.
                adapters::decrypt_stream(&secret_or_pwd, &mut dst, &mut src)
                    .map_err(|e| e.to_string())
            };

            if let Err(err) = run() {
                let _ = fs::remove_file(&out_path);
                return fail(&err, args.json);
            }
            emit_text_result("out", &out_path, args.json);
        }
        Subject::Stream => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut src = stdin.lock();
            let mut dst = stdout.lock();
            report(
                adapters::decrypt_stream(&secret_or_pwd, &mut dst, &mut src).map_err(|e| e.to_string()),
                args.json,
            )?;
        }
    }

    Ok(())
}

fn resolve_encrypt_key(args: &Args) -> Result<String, String> {
    if args.auto {
        let secret = SecretKey::new();
        let s = secret.to_envelope_string().map_err(|e| e.to_string())?;
        eprintln!("Generated secret key (save it, it will not be shown again): {s}");
        return Ok(s);
    }

    if let Some(path) = &args.public_key_file {
        return fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .map(|s| s.trim().to_string());
    }

    let key = match &args.key {
        Some(key) => key.clone(),
        None => rpassword::prompt_password("Password: ").map_err(|e| e.to_string())?,
    };

    let is_envelope = key.starts_with(envelope::PUBLIC_KEY_PREFIX) || key.starts_with(envelope::SECRET_KEY_PREFIX);
    if !is_envelope && !args.ignore_password_policy {
        password::check(&key)?;
    }

    Ok(key)
}

fn resolve_decrypt_secret() -> Result<String, String> {
    if let Ok(secret) = env::var("XIPHER_SECRET") {
        return Ok(secret);
    }
    rpassword::prompt_password("Secret: ").map_err(|e| e.to_string())
}

fn read_text_input(args: &Args) -> Result<String, String> {
    let text = args.text.clone().ok_or_else(|| "Missing --text".to_string())?;
    if text == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(|e| e.to_string())?;
        Ok(buf)
    } else {
        Ok(text)
    }
}

fn with_extension(path: &str, ext: &str) -> PathBuf {
    let mut p = PathBuf::from(path);
    p.set_extension(ext);
    p
}

fn strip_extension(path: &str, ext: &str) -> String {
    let p = Path::new(path);
    if p.extension().and_then(|e| e.to_str()) == Some(ext) {
        p.with_extension("").display().to_string()
    } else {
        path.to_string()
    }
}

fn write_new_file(path: &Path, contents: &[u8], overwrite: bool) -> Result<(), String> {
    let mut file = open_new_file(&path.display().to_string(), overwrite)?;
    file.write_all(contents).map_err(|e| e.to_string())
}

fn open_new_file(path: &str, overwrite: bool) -> Result<fs::File, String> {
    let mut opts = fs::OpenOptions::new();
    opts.write(true).truncate(true);
    if overwrite {
        opts.create(true);
    } else {
        opts.create_new(true);
    }
    opts.open(path)
        .map_err(|e| format!("Could not open '{path}' for writing: {e}"))
}

fn emit_text_result(field: &str, value: &str, json: bool) {
    if json {
        println!("{{\"{field}\":\"{value}\"}}");
    } else {
        println!("{value}");
    }
}

fn report<T>(result: Result<T, String>, json: bool) -> Result<T, i32> {
    result.map_err(|err| {
        print_error(&err, json);
        1
    })
}

fn fail(err: &str, json: bool) -> Result<(), i32> {
    print_error(err, json);
    Err(1)
}

fn print_error(err: &str, json: bool) {
    if json {
        eprintln!("{{\"error\":\"{err}\"}}");
    } else {
        eprintln!("{} {err}.", Color::error("fatal:"));
    }
}
