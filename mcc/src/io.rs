//! Reading and writing point files.
//!
//! Two formats are supported, chosen by file extension:
//!
//! - GeoJSON (`.geojson`, `.json`): `Point` and `MultiPoint`
//!   geometries, optionally wrapped in features.
//! - Text (anything else): one `x y [z]` point per line, separated by
//!   commas, pipes, semicolons, or whitespace. Blank lines and lines
//!   starting with `#` are skipped, and a first line without a single
//!   numeric field is taken to be a header.

use crate::{
    point::{LidarPoint, PointSet},
    MccError,
};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::{
    ffi::OsStr,
    fs::File,
    io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointFormat {
    Text,
    GeoJson,
}

impl PointFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json") => {
                Self::GeoJson
            }
            _ => Self::Text,
        }
    }
}

/// Reads the points stored at `path`.
///
/// An empty file is an error; use [`read_points_from`] to accept one.
pub fn read_points(path: &Path) -> Result<PointSet, MccError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MccError::InputNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let points = read_points_from(BufReader::new(file), PointFormat::from_path(path), path)?;
    if points.is_empty() {
        return Err(MccError::EmptyInput(path.to_path_buf()));
    }
    Ok(points)
}

/// Reads points in `format` from `rdr`.
///
/// `name` only appears in error messages.
pub fn read_points_from<R: BufRead>(
    rdr: R,
    format: PointFormat,
    name: &Path,
) -> Result<PointSet, MccError> {
    match format {
        PointFormat::Text => read_text(rdr, name),
        PointFormat::GeoJson => read_geojson(rdr, name),
    }
}

/// Writes `points` to `path`, replacing any existing file.
pub fn write_points(path: &Path, points: &PointSet) -> Result<(), MccError> {
    let mut wtr = BufWriter::new(File::create(path)?);
    write_points_to(&mut wtr, PointFormat::from_path(path), points)?;
    wtr.flush()?;
    Ok(())
}

pub fn write_points_to<W: Write>(
    mut wtr: W,
    format: PointFormat,
    points: &PointSet,
) -> Result<(), MccError> {
    match format {
        PointFormat::Text => {
            for LidarPoint { x, y, z } in points {
                writeln!(wtr, "{x},{y},{z}")?;
            }
        }
        PointFormat::GeoJson => {
            let features = points
                .iter()
                .map(|p| Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![p.x, p.y, p.z]))),
                    id: None,
                    properties: None,
                    foreign_members: None,
                })
                .collect();
            let collection = FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            };
            write!(wtr, "{}", GeoJson::from(collection))?;
        }
    }
    Ok(())
}

fn read_text<R: BufRead>(rdr: R, name: &Path) -> Result<PointSet, MccError> {
    let mut points = Vec::new();
    let mut seen_data = false;
    for (idx, line) in rdr.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = split_fields(line);
        if !seen_data && is_header(&fields) {
            seen_data = true;
            continue;
        }
        seen_data = true;
        let point = parse_fields(&fields).map_err(|msg| MccError::Parse {
            path: name.to_path_buf(),
            line: idx + 1,
            msg,
        })?;
        points.push(point);
    }
    Ok(PointSet::from(points))
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c == '|' || c == ';' || c.is_whitespace())
        .filter(|field| !field.is_empty())
        .collect()
}

/// A header row has no numeric field at all.
fn is_header(fields: &[&str]) -> bool {
    fields.iter().all(|field| field.parse::<f64>().is_err())
}

fn parse_fields(fields: &[&str]) -> Result<LidarPoint, String> {
    let coords = fields
        .iter()
        .map(|field| match field.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(_) => Err(format!("non-finite coordinate '{field}'")),
            Err(_) => Err(format!("invalid number '{field}'")),
        })
        .collect::<Result<Vec<f64>, String>>()?;
    match coords[..] {
        [x, y] => Ok(LidarPoint::new(x, y, 0.0)),
        [x, y, z, ..] => Ok(LidarPoint::new(x, y, z)),
        _ => Err(format!("expected at least 2 coordinates, got {}", coords.len())),
    }
}

fn read_geojson<R: Read>(rdr: R, name: &Path) -> Result<PointSet, MccError> {
    let mut points = Vec::new();
    match GeoJson::from_reader(rdr).map_err(geojson::Error::MalformedJson)? {
        GeoJson::Geometry(geometry) => push_geometry(&geometry, name, &mut points)?,
        GeoJson::Feature(feature) => {
            if let Some(geometry) = &feature.geometry {
                push_geometry(geometry, name, &mut points)?;
            }
        }
        GeoJson::FeatureCollection(collection) => {
            for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
                push_geometry(geometry, name, &mut points)?;
            }
        }
    }
    Ok(PointSet::from(points))
}

fn push_geometry(
    geometry: &Geometry,
    name: &Path,
    points: &mut Vec<LidarPoint>,
) -> Result<(), MccError> {
    let unsupported = |kind: &str| MccError::Parse {
        path: name.to_path_buf(),
        line: 0,
        msg: format!("unsupported geometry type {kind}"),
    };
    match &geometry.value {
        Value::Point(position) => points.push(from_position(position, name)?),
        Value::MultiPoint(positions) => {
            for position in positions {
                points.push(from_position(position, name)?);
            }
        }
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                push_geometry(geometry, name, points)?;
            }
        }
        Value::LineString(_) => return Err(unsupported("LineString")),
        Value::MultiLineString(_) => return Err(unsupported("MultiLineString")),
        Value::Polygon(_) => return Err(unsupported("Polygon")),
        Value::MultiPolygon(_) => return Err(unsupported("MultiPolygon")),
    }
    Ok(())
}

fn from_position(position: &[f64], name: &Path) -> Result<LidarPoint, MccError> {
    let parse_err = |msg: String| MccError::Parse {
        path: name.to_path_buf(),
        line: 0,
        msg,
    };
    if let Some(value) = position.iter().find(|value| !value.is_finite()) {
        return Err(parse_err(format!("non-finite coordinate '{value}'")));
    }
    match *position {
        [x, y] => Ok(LidarPoint::new(x, y, 0.0)),
        [x, y, z, ..] => Ok(LidarPoint::new(x, y, z)),
        _ => Err(parse_err(format!(
            "position with {} coordinates",
            position.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_points, read_points_from, write_points, write_points_to, PointFormat};
    use crate::{LidarPoint, MccError, PointSet};
    use std::path::Path;

    fn read_text(text: &str) -> Result<PointSet, MccError> {
        read_points_from(text.as_bytes(), PointFormat::Text, Path::new("test.txt"))
    }

    #[test]
    fn test_text_separators_and_header() {
        let points = read_text("x,y,z\n1,2,3\n\n# comment\n4|5|6\n7 8\n9;10;11;99\n").unwrap();
        assert_eq!(
            points.as_slice(),
            &[
                LidarPoint::new(1.0, 2.0, 3.0),
                LidarPoint::new(4.0, 5.0, 6.0),
                LidarPoint::new(7.0, 8.0, 0.0),
                LidarPoint::new(9.0, 10.0, 11.0),
            ]
        );
    }

    #[test]
    fn test_text_bad_line_reports_position() {
        let err = read_text("1,2,3\n4,five,6\n").unwrap_err();
        assert!(matches!(err, MccError::Parse { line: 2, .. }));

        let err = read_text("1,2\n3\n").unwrap_err();
        assert!(err.to_string().contains("expected at least 2 coordinates"));
    }

    #[test]
    fn test_bad_first_line_is_not_a_header() {
        let err = read_text("1,2,abc\n3,4,5\n").unwrap_err();
        assert!(matches!(err, MccError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("invalid number 'abc'"));
    }

    #[test]
    fn test_text_rejects_non_finite() {
        for text in ["nan,1,1\n", "1,inf,1\n", "1,2,-infinity\n"] {
            let err = read_text(text).unwrap_err();
            assert!(matches!(err, MccError::Parse { line: 1, .. }), "{text}");
            assert!(err.to_string().contains("non-finite"), "{text}");
        }
    }

    #[test]
    fn test_malformed_geojson() {
        let json = r#"{"type": "FeatureCollection", "features": ["#;
        let res = read_points_from(json.as_bytes(), PointFormat::GeoJson, Path::new("t.geojson"));
        assert!(matches!(res, Err(MccError::GeoJson(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_points(&path).is_err());
    }

    #[test]
    fn test_geojson_points() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "Point", "coordinates": [1.0, 2.0, 3.0]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "MultiPoint", "coordinates": [[4.0, 5.0], [6.0, 7.0, 8.0]]}}
            ]
        }"#;
        let points =
            read_points_from(json.as_bytes(), PointFormat::GeoJson, Path::new("t.geojson"))
                .unwrap();
        assert_eq!(
            points.as_slice(),
            &[
                LidarPoint::new(1.0, 2.0, 3.0),
                LidarPoint::new(4.0, 5.0, 0.0),
                LidarPoint::new(6.0, 7.0, 8.0),
            ]
        );
    }

    #[test]
    fn test_geojson_rejects_polygons() {
        let json = r#"{"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}"#;
        let err = read_points_from(json.as_bytes(), PointFormat::GeoJson, Path::new("t.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Polygon"));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let points = PointSet::from(vec![
            LidarPoint::new(0.1, -2.5, 100.25),
            LidarPoint::new(1e6, 3.0, 0.0),
        ]);
        for name in ["out.txt", "out.geojson"] {
            let path = dir.path().join(name);
            write_points(&path, &points).unwrap();
            assert_eq!(read_points(&path).unwrap(), points);
        }
    }

    #[test]
    fn test_text_output_format() {
        let mut buf = Vec::new();
        let points = PointSet::from(vec![LidarPoint::new(1.5, 2.0, -3.0)]);
        write_points_to(&mut buf, PointFormat::Text, &points).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1.5,2,-3\n");
    }

    #[test]
    fn test_missing_and_empty_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            read_points(&missing),
            Err(MccError::InputNotFound(_))
        ));

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "# nothing here\n").unwrap();
        assert!(matches!(read_points(&empty), Err(MccError::EmptyInput(_))));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            PointFormat::from_path(Path::new("a.GeoJSON")),
            PointFormat::GeoJson
        );
        assert_eq!(PointFormat::from_path(Path::new("a.xyz")), PointFormat::Text);
        assert_eq!(PointFormat::from_path(Path::new("a")), PointFormat::Text);
    }
}
