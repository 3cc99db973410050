//! # Server - RiptideKV TCP Front-End
//!
//! A line-oriented TCP server translating text commands into calls against
//! the storage engine. One thread is spawned per accepted connection;
//! `COMPACT` acknowledges immediately and runs the merge on a thread of its
//! own so a slow compaction never blocks the connection that requested it.
//!
//! ## Commands
//!
//! ```text
//! PUT key value   Insert or update a key-value pair -> OK
//! GET key         Look up a key -> value, or (nil) if absent/deleted
//! DEL key         Delete a key (writes a tombstone) -> OK
//! COMPACT         Trigger a full merge of all SSTables -> OK (compacting)
//! ```
//!
//! Any other verb is answered with a line beginning `ERR`.
//!
//! ## Configuration
//!
//! ```text
//! MEMTABLE_LIMIT  distinct keys before a flush       (default: 1024)
//! BLOOM_BYTES     bloom filter size per SSTable       (default: 1024)
//! WAL_PATH        write-ahead log path                (default: "wal.log")
//! DATA_DIR        SSTable directory                   (default: "data")
//! BIND_ADDR       TCP address to listen on             (default: "127.0.0.1:7878")
//! WAL_SYNC        fsync every WAL append               (default: "true")
//! ```
use anyhow::Result;
use config::{EngineConfig, ServerConfig};
use engine::Engine;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let engine_config = EngineConfig::from_env();
    let server_config = ServerConfig::from_env();

    let engine = Arc::new(Engine::open(engine_config, server_config.wal_sync)?);
    let listener = TcpListener::bind(&server_config.bind_addr)?;

    info!(addr = %server_config.bind_addr, "riptide-server listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let engine = Arc::clone(&engine);
                thread::spawn(move || handle_connection(stream, engine));
            }
            Err(e) => warn!(error = %e, "failed to accept connection"),
        }
    }

    Ok(())
}

fn handle_connection(stream: TcpStream, engine: Arc<Engine>) {
    let peer = stream.peer_addr().ok();
    info!(?peer, "connection accepted");

    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(e) => {
            warn!(error = %e, "failed to clone connection");
            return;
        }
    };
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "connection read error");
                break;
            }
        };

        let reply = dispatch(&line, &engine);
        if writeln!(writer, "{}", reply).is_err() {
            break;
        }
    }

    info!(?peer, "connection closed");
}

/// Parses and executes a single command line, returning the reply line.
fn dispatch(line: &str, engine: &Arc<Engine>) -> String {
    let mut parts = line.split(' ');
    let verb = parts.next().unwrap_or("");

    match verb.to_ascii_uppercase().as_str() {
        "PUT" => {
            let key = parts.next();
            let value: String = parts.collect::<Vec<_>>().join(" ");
            match key {
                Some(key) if !value.is_empty() => {
                    match engine.put(key.as_bytes().to_vec(), value.into_bytes()) {
                        Ok(()) => "OK".to_string(),
                        Err(e) => format!("ERR {}", e),
                    }
                }
                _ => "ERR usage: PUT <key> <value>".to_string(),
            }
        }
        "GET" => match parts.next() {
            Some(key) => match engine.get(key.as_bytes()) {
                Ok(Some(value)) => String::from_utf8_lossy(&value).into_owned(),
                Ok(None) => "(nil)".to_string(),
                Err(e) => format!("ERR {}", e),
            },
            None => "ERR usage: GET <key>".to_string(),
        },
        "DEL" => match parts.next() {
            Some(key) => match engine.delete(key.as_bytes().to_vec()) {
                Ok(()) => "OK".to_string(),
                Err(e) => format!("ERR {}", e),
            },
            None => "ERR usage: DEL <key>".to_string(),
        },
        "COMPACT" => {
            let engine = Arc::clone(engine);
            thread::spawn(move || {
                if let Err(e) = engine.compact() {
                    warn!(error = %e, "background compaction failed");
                }
            });
            "OK (compacting)".to_string()
        }
        _ => format!("ERR unknown command: {}", verb),
    }
}
