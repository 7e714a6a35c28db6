// src/coords.rs

use crate::error::{LineageError, Result};
use crate::model::PackageCoordinate;
use crate::store::MethodStore;
use crate::version::is_unqualified;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Parses `group:artifact:version` lines. Blank lines are skipped; fields
/// after the third are ignored.
pub fn parse_coordinates<R: BufRead>(reader: R) -> Result<Vec<PackageCoordinate>> {
    let mut coordinates = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LineageError::Io {
            path: "<coordinates>".into(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(':').collect();
        if fields.len() < 3 {
            return Err(LineageError::InvalidCoordinateLine {
                line_number: idx + 1,
                line,
            });
        }
        coordinates.push(PackageCoordinate::new(fields[0], fields[1], fields[2]));
    }

    Ok(coordinates)
}

pub fn read_coordinates(path: &Path) -> Result<Vec<PackageCoordinate>> {
    let file = File::open(path).map_err(|source| LineageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_coordinates(BufReader::new(file))
}

/// Every unqualified version the store knows for each input package.
pub fn expand(input: &[PackageCoordinate], store: &dyn MethodStore) -> Result<Vec<PackageCoordinate>> {
    let mut expanded = BTreeSet::new();

    for coordinate in input {
        let known = store.versions_of(&coordinate.group, &coordinate.artifact)?;
        let before = expanded.len();
        expanded.extend(
            known
                .into_iter()
                .filter(|version| is_unqualified(version))
                .map(|version| PackageCoordinate::new(&coordinate.group, &coordinate.artifact, version)),
        );
        debug!(package = %coordinate.package_name(), added = expanded.len() - before, "expanded coordinate");
    }

    Ok(expanded.into_iter().collect())
}

pub fn write_coordinates(path: &Path, coordinates: &[PackageCoordinate]) -> Result<()> {
    let io_err = |source| LineageError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for coordinate in coordinates {
        writeln!(out, "{}", coordinate).map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}
