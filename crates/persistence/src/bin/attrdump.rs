#![deny(warnings)]

use anyhow::{Context, Result};
use persistence::{decode_parameter, AttributeStore};
use std::path::PathBuf;

fn main() -> Result<()> {
    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: attrdump <attributes.bin>")?;
    let store = AttributeStore::load(&path)?;
    for (attr, city, bytes) in store.iter() {
        match decode_parameter(bytes) {
            Ok(p) => println!(
                "{city} {attr:?}: minimal {:?} factor {:?} happy {} target {:?} require_happy {}",
                p.minimal_surplus.0, p.factor.0, p.happy_factor, p.factor_target, p.require_happy
            ),
            Err(e) => println!("{city} {attr:?}: {} bytes ({e})", bytes.len()),
        }
    }
    println!("{} attributes in {}", store.len(), path.display());
    Ok(())
}
