pub(super) const ROOT_LONG_ABOUT: &str = "\
Compute and verify content-integrity manifests

Treeseal records a cryptographic digest for a file or a whole directory tree in a
JSON manifest (.integrity.json) and later verifies the tree against it. A directory
digest covers the names and digests of everything below it, so any added, removed,
renamed or modified entry changes it.

CORE CONCEPTS:

  Manifest:
    A JSON document with a format version and a map of entry names to digests:

      {
        \"version\": \"1\",
        \"hashes\": {
          \"project\": {
            \"contents\": { \"README.md\": \"...\", \"src\": { ... } },
            \"hash\": \"...\"
          }
        }
      }

    Verbose manifests (the default) keep a digest for every entry in the tree, so
    single files and subdirectories can be verified against the manifest of an
    ancestor. Compact manifests (--compact) keep only the top-level digest.

  Integrity reference:
    What a path is checked against. One of:
      - a .integrity.json file
      - a directory; the nearest .integrity.json in it or above it is used
      - manifest JSON given inline
      - a bare digest string

  Algorithms and encodings:
    md5, sha1, sha224, sha256, sha384, sha512, each encoded as hex, base64 or
    latin1. The default is md5 with hex. With --detect, check finds out which
    combination produced a reference on its own.

TYPICAL WORKFLOW:

  1. Record the state of a directory:
     $ treeseal create --write path/to/project

  2. Later, verify it:
     $ treeseal check path/to/project

  3. Verify a single file against the same manifest:
     $ treeseal check path/to/project/src/main.rs

CONFIGURATION:

  A .treeseal.toml in the working directory (after -C) sets defaults:

    algorithm = \"sha256\"
    encoding = \"hex\"
    exclude = [\"target\", \".git\"]
    verbose = true

  Command-line flags take precedence. Exclusions from both are combined.

GLOBAL OPTIONS:

  -C <DIRECTORY>
    Change to directory before operating (like git -C or make -C).

  -v, -vv, --log-level <LEVEL>
    Logging verbosity on stderr. Takes precedence over RUST_LOG.

EXIT CODES:

  0    integrity check passed / manifest created
  1    integrity check failed
  255  any other error

For detailed help on any command, use:
  treeseal <command> --help
";

pub(super) const CREATE_LONG_ABOUT: &str = "\
Hash a file or directory into a manifest

Computes the digest of PATH and prints a manifest keyed by PATH's name to stdout.
Directories are hashed recursively; entries are visited in name order, so the result
does not depend on the filesystem. Existing .integrity.json files inside the tree
are never hashed. Symbolic links are followed.

With --write, the manifest is saved as .integrity.json inside PATH when PATH is a
directory, or next to PATH when it is a file. The file is replaced atomically.
An existing .integrity.json that records other entries (for example the manifest
of the whole directory, when PATH is a file in it) is left alone and the command
fails; --force replaces it anyway.

EXCLUSIONS:

  -x PATTERN leaves out every entry named PATTERN anywhere in the tree, or the entry
  at PATTERN when it is a path relative to PATH (e.g. -x build/cache). Repeatable.

EXAMPLES:

  # Print a verbose md5/hex manifest of the current directory
  $ treeseal create

  # Record a compact sha512/base64 manifest in the directory
  $ treeseal create --write --compact -a sha512 -e base64 ./dist

  # Skip version control metadata
  $ treeseal create --write -x .git .
";

pub(super) const CHECK_LONG_ABOUT: &str = "\
Verify a file or directory against a manifest or digest

Hashes PATH again and compares the result with the recorded entry for it. Without
-i, the nearest .integrity.json in PATH's directory or above is used.

The hashing options must match the ones the reference was created with: the same
algorithm, encoding, exclusions and verbosity. A compact reference only verifies
against --compact; a verbose one needs a verbose rebuild. Use --detect when the
algorithm and encoding are unknown; verbosity is then taken from the reference.

When no manifest can be found, or it holds no entry for PATH, the check fails with
exit code 1. A malformed manifest or one written for another format version is an
error (exit code 255).

EXAMPLES:

  # Verify a directory against its own manifest
  $ treeseal check ./dist

  # Verify one file against the manifest of an ancestor
  $ treeseal check ./dist/app.js -i ./dist

  # Verify against a published digest of unknown algorithm
  $ treeseal check release.tar.gz -i 4Ghdtni0l5zlMyVmdd4Sjg== --detect
";
