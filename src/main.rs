mod cmd;

use std::env;
use std::process;

use lessify::Pager;

use cmd::cli;
use cmd::ui::Color;

fn main() {
    let args = match cli::Args::build_from_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{} {err}.", Color::error("fatal:"));
            println!("Try '{bin} -h' for help.", bin = env!("CARGO_BIN_NAME"));
            process::exit(2);
        }
    };

    if args.long_help {
        long_help();
    } else if args.short_help {
        short_help();
    } else if args.version {
        version();
    } else if let Some(command) = &args.command {
        let result = match command {
            cli::Command::GenKey => cmd::genkey(&args),
            cli::Command::Encrypt(_) => cmd::encrypt(&args),
            cli::Command::Decrypt(_) => cmd::decrypt(&args),
        };
        if let Err(code) = result {
            process::exit(code);
        }
    } else {
        // No arguments.
        short_help();
    }
}

fn short_help() {
    println!("{}", short_help_message());
    println!(
        "For full help, see `{bin} --help`.",
        bin = env!("CARGO_BIN_NAME")
    );
}

fn short_help_message() -> String {
    format!(
        "\
{description}

Usage: {bin} [<options>] <command> [<args>]

Commands:
  genkey                      Generate a secret key (and optionally a public key)
  encrypt text|file|stream    Encrypt under a key or password
  decrypt text|file|stream    Decrypt under a key or password

Options:
  -h, --help                  Show this message and exit
  -V, --version                Show the version and exit
  -p, --public-key-file <F>   Write/read the public key as XPK_ (genkey)
  -q, --quantum-safe          Derive an ML-KEM-1024 public key instead of X25519
      --ignore-password-policy  Skip the password strength check
  -a, --auto                  Use a random secret key instead of a password
  -k, --key <KEY>             Public key, secret key, or password (encrypt)
  -t, --text <TEXT>           Inline text, '-' for stdin
      --ciphertext <CT>       Inline ciphertext (decrypt text)
  -f, --file <PATH>           Input file
  -o, --out <PATH>            Output file
  -c, --compress              Enable zlib compression
  -j, --json                  Machine-readable output
      --overwrite             Replace an existing destination file
      --xiphertext            Wrap file/stream ciphertext in the XCT_ text envelope
",
        description = env!("CARGO_PKG_DESCRIPTION"),
        bin = env!("CARGO_BIN_NAME"),
    )
}

#[allow(clippy::too_many_lines)]
fn long_help() {
    Pager::page_or_print(&format!(
        "\
{help}
What does {package} do?
  {package} encrypts data for a recipient who holds either a password or
  a key pair. A sender needs only the recipient's public key (or their
  password) to produce ciphertext the recipient can open; a password-
  based recipient never has to manage key files.

  genkey:
    Generates a secret key (`XSK_…`), printed to stdout. With
    -p/--public-key-file, also derives and writes the matching public
    key (`XPK_…`) to a `.xpk` file; -q/--quantum-safe picks an
    ML-KEM-1024 public key instead of the default X25519 one. A secret
    key is always the same shape regardless of which public key was
    last derived from it.

  encrypt text|file|stream, decrypt text|file|stream:
    -k/--key accepts a public key, a secret key, or a bare password; the
    kind is detected from its `XPK_`/`XSK_` prefix, falling back to
    'treat it as a password'. -a/--auto generates a random secret key
    on the fly instead of asking for one (it is printed once, to
    stderr, and is not recoverable afterwards). Encrypting under a
    public key or a password produces ciphertext only the matching
    secret key, or that same password, can open.

    -c/--compress zlib-compresses the plaintext before sealing it;
    this can leak length/statistical information about the plaintext
    when it is partly attacker-controlled, so only enable it for data
    you trust end to end. --xiphertext wraps file/stream ciphertext in
    the `XCT_` text envelope (base32, no padding) so it round-trips
    safely through text-only channels; without it, file/stream output
    is raw binary.

  Key and ciphertext formats:
    `XSK_…`  secret key  (fixed length, 106 base32 characters)
    `XPK_…`  public key
    `XCT_…`  ciphertext, text-enveloped

  Decryption reads the secret (or password) from $XIPHER_SECRET when
  set, otherwise prompts for it with the terminal echo disabled. On
  file decryption, a failure (wrong key, tampered data) removes the
  partially written destination rather than leaving truncated output
  behind.
",
        help = short_help_message(),
        package = env!("CARGO_PKG_NAME"),
    ));
}

fn version() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
}
