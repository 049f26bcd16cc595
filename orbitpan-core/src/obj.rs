/// Wavefront OBJ loader (positions and faces only)
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::tag,
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{preceded, terminated, tuple},
    IResult,
};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::geometry::{Mesh, Triangle};

/// Read and parse an OBJ file from disk.
pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    let mesh = parse_obj(&source)?;
    debug!(path = %path.display(), triangles = mesh.triangles.len(), "loaded OBJ mesh");
    Ok(mesh)
}

/// Parse OBJ text. Polygons are fan-triangulated; records other than `v`
/// and `f` are skipped.
pub fn parse_obj(source: &str) -> MeshResult<Mesh> {
    let mut positions: Vec<Point3<f32>> = Vec::new();
    let mut mesh = Mesh::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or_default().trim();
        let malformed = |record| MeshError::Malformed {
            line,
            record,
            text: text.to_string(),
        };

        match text.split_whitespace().next() {
            Some("v") => {
                let (_, position) = all_consuming(vertex_record)(text).map_err(|_| malformed("vertex"))?;
                positions.push(position);
            }
            Some("f") => {
                let (_, corners) = all_consuming(face_record)(text).map_err(|_| malformed("face"))?;
                if corners.len() < 3 {
                    return Err(MeshError::DegenerateFace {
                        line,
                        found: corners.len(),
                    });
                }
                let corners = corners
                    .into_iter()
                    .map(|index| resolve_index(index, positions.len(), line).map(|i| positions[i]))
                    .collect::<MeshResult<Vec<_>>>()?;
                for pair in corners[1..].windows(2) {
                    mesh.add_triangle(Triangle::from_positions(corners[0], pair[0], pair[1]));
                }
            }
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(MeshError::Empty);
    }
    Ok(mesh)
}

/// 1-based, or negative counting back from the latest vertex.
fn resolve_index(index: i64, count: usize, line: usize) -> MeshResult<usize> {
    let resolved = match index {
        i if i > 0 => usize::try_from(i - 1).ok(),
        i if i < 0 => usize::try_from(count as i64 + i).ok(),
        _ => None,
    };
    resolved
        .filter(|&i| i < count)
        .ok_or(MeshError::IndexOutOfRange { line, index, count })
}

/// `v x y z [w]`
fn vertex_record(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, (x, y, z)) = preceded(
        tag("v"),
        tuple((
            preceded(space1, float),
            preceded(space1, float),
            preceded(space1, float),
        )),
    )(input)?;
    let (input, _) = terminated(opt(preceded(space1, float)), space0)(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// `f a b c ...` where each corner is `i`, `i/t`, `i//n` or `i/t/n`
fn face_record(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = tag("f")(input)?;
    let (input, _) = space1(input)?;
    terminated(separated_list1(space1, face_corner), space0)(input)
}

fn face_corner(input: &str) -> IResult<&str, i64> {
    let (input, position) = integer(input)?;
    let (input, _) = opt(preceded(char('/'), opt(integer)))(input)?;
    let (input, _) = opt(preceded(char('/'), opt(integer)))(input)?;
    Ok((input, position))
}
