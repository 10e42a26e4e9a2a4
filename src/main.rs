use std::collections::BTreeMap;
use std::env;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use poset_registry::{hasse, PosetError, PosetHandle, Registry, RegistryConfig};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// One script line. `poset` is a label bound by `new`, or a raw handle.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    New { poset: String },
    Delete { poset: String },
    Size { poset: String },
    Insert { poset: String, name: String },
    Remove { poset: String, name: String },
    Add { poset: String, lesser: String, greater: String },
    Del { poset: String, lesser: String, greater: String },
    Test { poset: String, lesser: String, greater: String },
    Clear { poset: String },
}

struct Session {
    registry: Registry,
    labels: BTreeMap<String, PosetHandle>,
}

impl Session {
    fn handle(&self, label: &str) -> Result<PosetHandle> {
        if let Some(&h) = self.labels.get(label) {
            return Ok(h);
        }
        match label.parse::<u64>() {
            Ok(raw) => Ok(PosetHandle(raw)),
            Err(_) => bail!("unknown poset label {label:?}"),
        }
    }

    fn run(&mut self, cmd: Command) -> Result<Value> {
        let out = match cmd {
            Command::New { poset } => {
                let h = self.registry.create();
                self.labels.insert(poset, h);
                json!(h)
            }
            Command::Delete { poset } => {
                let h = self.handle(&poset)?;
                self.labels.retain(|_, v| *v != h);
                verdict(self.registry.destroy(h))
            }
            Command::Size { poset } => json!(self.registry.size(self.handle(&poset)?)),
            Command::Insert { poset, name } => {
                let h = self.handle(&poset)?;
                verdict(self.registry.insert(h, &name))
            }
            Command::Remove { poset, name } => {
                let h = self.handle(&poset)?;
                verdict(self.registry.remove(h, &name))
            }
            Command::Add { poset, lesser, greater } => {
                let h = self.handle(&poset)?;
                verdict(self.registry.add(h, &lesser, &greater))
            }
            Command::Del { poset, lesser, greater } => {
                let h = self.handle(&poset)?;
                verdict(self.registry.del(h, &lesser, &greater))
            }
            Command::Test { poset, lesser, greater } => {
                json!(self.registry.test(self.handle(&poset)?, &lesser, &greater))
            }
            Command::Clear { poset } => {
                let h = self.handle(&poset)?;
                verdict(self.registry.clear(h))
            }
        };
        Ok(out)
    }
}

fn verdict(result: Result<(), PosetError>) -> Value {
    match result {
        Ok(()) => json!(true),
        Err(err) if err.is_rejection() => json!({ "ok": false, "reason": err.to_string() }),
        Err(err) => json!({ "ok": false, "fatal": err.to_string() }),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("POSET_LOG")
        .unwrap_or_else(|_| EnvFilter::new("poset_registry=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> Result<()> {
    init_tracing();
    let config = match env::var("POSET_CONFIG") {
        Ok(raw) => RegistryConfig::from_json(&raw)?,
        Err(_) => RegistryConfig::from_env()?,
    };

    // Read all stdin (NDJSON or array-of-objects)
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    let s = buf.trim();

    let script: Vec<Command> = if s.starts_with('[') {
        serde_json::from_str(s).context("invalid command array")?
    } else {
        s.lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(n, l)| serde_json::from_str(l).with_context(|| format!("line {}", n + 1)))
            .collect::<Result<_>>()?
    };

    let mut session = Session { registry: Registry::with_config(&config), labels: BTreeMap::new() };
    for cmd in script {
        let line = format!("{cmd:?}");
        let out = session.run(cmd)?;
        println!("{line} -> {out}");
    }

    for (label, &h) in &session.labels {
        let Some(poset) = session.registry.get(h) else { continue };
        println!("Poset {label} ({h}):");
        println!("  Linear extension: {:?}", hasse::linear_extension(poset)?);
        println!("  Hasse edges:");
        for (a, b) in hasse::covers(poset) {
            println!("    {a} -> {b}");
        }
    }
    Ok(())
}
