//! Hand-rolled argument parser for the `xipher` CLI.
//!
//! `-c` is wanted as a short form for both `--ciphertext` and
//! `--compress`; this parser resolves the collision by keeping `-c` as
//! the short form of `--compress` only (the more common boolean toggle)
//! and requiring `--ciphertext` spelled out in full. See `DESIGN.md`.

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Subject {
    Text,
    File,
    Stream,
}

impl Subject {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "file" => Some(Self::File),
            "stream" => Some(Self::Stream),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum Command {
    GenKey,
    Encrypt(Subject),
    Decrypt(Subject),
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Args {
    pub command: Option<Command>,
    pub short_help: bool,
    pub long_help: bool,
    pub version: bool,

    pub public_key_file: Option<String>,
    pub quantum_safe: bool,
    pub ignore_password_policy: bool,
    pub auto: bool,
    pub key: Option<String>,
    pub text: Option<String>,
    pub ciphertext: Option<String>,
    pub file: Option<String>,
    pub out: Option<String>,
    pub compress: bool,
    pub json: bool,
    pub overwrite: bool,
    pub xiphertext: bool,
}

impl Args {
    pub fn build_from_args<I>(mut cli_args: I) -> Result<Self, String>
    where
        I: Iterator<Item: AsRef<str> + ToString>,
    {
        let mut args = Self::default();

        while let Some(arg) = cli_args.next() {
            let some_command = args.command.is_some();

            match arg.as_ref() {
                "genkey" if !some_command => args.command = Some(Command::GenKey),
                "encrypt" if !some_command => {
                    args.command = Some(Command::Encrypt(next_subject(&mut cli_args)?));
                }
                "decrypt" if !some_command => {
                    args.command = Some(Command::Decrypt(next_subject(&mut cli_args)?));
                }
                "-h" => args.short_help = true,
                "--help" => args.long_help = true,
                "-V" | "--version" => args.version = true,

                "-p" | "--public-key-file" => {
                    args.public_key_file = Some(next_value(&mut cli_args, "--public-key-file")?);
                }
                "-q" | "--quantum-safe" => args.quantum_safe = true,
                "--ignore-password-policy" => args.ignore_password_policy = true,
                "-a" | "--auto" => args.auto = true,
                "-k" | "--key" => args.key = Some(next_value(&mut cli_args, "--key")?),
                "-t" | "--text" => args.text = Some(next_value(&mut cli_args, "--text")?),
                "--ciphertext" => args.ciphertext = Some(next_value(&mut cli_args, "--ciphertext")?),
                "-f" | "--file" => args.file = Some(next_value(&mut cli_args, "--file")?),
                "-o" | "--out" => args.out = Some(next_value(&mut cli_args, "--out")?),
                "-c" | "--compress" => args.compress = true,
                "-j" | "--json" => args.json = true,
                "--overwrite" => args.overwrite = true,
                "--xiphertext" => args.xiphertext = true,

                unknown => {
                    return Err(format!("Unknown argument: '{unknown}'"));
                }
            }
        }

        Ok(args)
    }
}

fn next_subject<I>(cli_args: &mut I) -> Result<Subject, String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    let raw = cli_args
        .next()
        .ok_or_else(|| "Expected a subject: 'text', 'file', or 'stream'".to_string())?;
    Subject::parse(raw.as_ref()).ok_or_else(|| format!("Unknown subject: '{}'", raw.to_string()))
}

fn next_value<I>(cli_args: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item: AsRef<str> + ToString>,
{
    cli_args
        .next()
        .map(|v| v.to_string())
        .ok_or_else(|| format!("Expected a value after '{flag}'"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::iter_on_single_items)]

    use super::*;

    #[test]
    fn command_genkey_regular() {
        let args = Args::build_from_args(["genkey"].iter()).unwrap();
        assert!(args.command.is_some_and(|c| c == Command::GenKey));
    }

    #[test]
    fn command_encrypt_requires_subject() {
        let args = Args::build_from_args(["encrypt", "text"].iter()).unwrap();
        assert!(args.command.is_some_and(|c| c == Command::Encrypt(Subject::Text)));
    }

    #[test]
    fn command_encrypt_without_subject_is_error() {
        let err = Args::build_from_args(["encrypt"].iter()).unwrap_err();
        assert!(err.contains("subject"));
    }

    #[test]
    fn command_decrypt_stream() {
        let args = Args::build_from_args(["decrypt", "stream"].iter()).unwrap();
        assert!(args.command.is_some_and(|c| c == Command::Decrypt(Subject::Stream)));
    }

    #[test]
    fn second_command_does_not_override_genkey() {
        let err = Args::build_from_args(["genkey", "encrypt", "text"].iter()).unwrap_err();
        assert!(err.contains("'encrypt'"));
    }

    #[test]
    fn flags_are_parsed() {
        let args = Args::build_from_args(
            ["encrypt", "text", "-t", "hello", "-k", "pass", "-c", "-q", "--overwrite"].iter(),
        )
        .unwrap();
        assert_eq!(args.text.as_deref(), Some("hello"));
        assert_eq!(args.key.as_deref(), Some("pass"));
        assert!(args.compress);
        assert!(args.quantum_safe);
        assert!(args.overwrite);
    }

    #[test]
    fn ciphertext_flag_has_no_short_alias_collision_with_compress() {
        let args = Args::build_from_args(["decrypt", "text", "--ciphertext", "XCT_ABC", "-c"].iter()).unwrap();
        // `-c` here means `--compress`, not `--ciphertext`; that's intentional.
        assert_eq!(args.ciphertext.as_deref(), Some("XCT_ABC"));
        assert!(args.compress);
    }

    #[test]
    fn option_short_help_regular() {
        let args = Args::build_from_args(["-h"].iter()).unwrap();
        assert!(args.short_help);
        assert!(!args.long_help);
    }

    #[test]
    fn option_long_help_regular() {
        let args = Args::build_from_args(["--help"].iter()).unwrap();
        assert!(!args.short_help);
        assert!(args.long_help);
    }

    #[test]
    fn option_version_regular() {
        let args = Args::build_from_args(["--version"].iter()).unwrap();
        assert!(args.version);
    }

    #[test]
    fn unknown_flag_is_error() {
        let err = Args::build_from_args(["--nonsense"].iter()).unwrap_err();
        assert!(err.contains("Unknown argument"));
    }

    #[test]
    fn flag_missing_value_is_error() {
        let err = Args::build_from_args(["--key"].iter()).unwrap_err();
        assert!(err.contains("Expected a value"));
    }
}
