use entities::ENTITIES;
use std::io::{self, BufWriter, Write};
use std::{env, fs::File, path::PathBuf};

// The entity module only needs to know which names form a well-formed named
// reference ("amp" for "&amp;") and what they decode to.  `ENTITIES` lists
// names both with and without the trailing ";" and is not sorted; keep the
// terminated forms only, sorted by name for binary search.
fn main() -> io::Result<()> {
    let out_dir: PathBuf = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set"))?;

    let mut named = ENTITIES
        .iter()
        .filter_map(|e| {
            e.entity
                .strip_prefix('&')
                .and_then(|s| s.strip_suffix(';'))
                .map(|name| (name, e.characters))
        })
        .collect::<Vec<_>>();
    named.sort_by_key(|(name, _)| *name);
    named.dedup_by_key(|(name, _)| *name);

    let mut out = BufWriter::new(File::create(out_dir.join("entitynames.rs"))?);
    writeln!(out, "mod entitynames {{")?;
    writeln!(
        out,
        "    pub static NAMED_ENTITIES: &[(&str, &str); {}] = &[",
        named.len()
    )?;
    for (name, characters) in named {
        writeln!(out, "        ({:?}, {:?}),", name, characters)?;
    }
    writeln!(out, "    ];")?;
    writeln!(out, "}}")?;
    out.flush()
}
