//! External formats through the pasture library
//!
//! LAS and LAZ files are read with `pasture-io` when the `pasture` feature is
//! enabled. Their 16-bit colors and classification codes are converted into
//! the same column shapes the PLY reader produces.

/// Narrow 16-bit color channels to 8 bits.
///
/// When any green value exceeds 255 the colors are assumed to use the full
/// 16-bit range and are rescaled linearly (65535 -> 255); otherwise they
/// already fit and are truncated.
pub fn widen_colors(colors: &[[u16; 3]]) -> Vec<[u8; 3]> {
    let sixteen_bit = colors.iter().any(|c| c[1] > 255);
    let convert = |v: u16| -> u8 {
        if sixteen_bit {
            (v as f64 / 65535.0 * 255.0) as u8
        } else {
            v as u8
        }
    };

    colors
        .iter()
        .map(|c| [convert(c[0]), convert(c[1]), convert(c[2])])
        .collect()
}

#[cfg(feature = "pasture")]
pub use backend::PastureFormat;

#[cfg(feature = "pasture")]
mod backend {
    use super::widen_colors;
    use crate::registry::PointSetFormat;
    use log::info;
    use pasture_core::containers::*;
    use pasture_core::layout::attributes::{CLASSIFICATION, COLOR_RGB, POSITION_3D};
    use pasture_core::nalgebra::Vector3;
    use pointclass_core::{Error, Point3f, PointSet, Result};
    use std::path::Path;

    /// Reader for LAS/LAZ point clouds
    pub struct PastureFormat;

    impl PointSetFormat for PastureFormat {
        fn load(&self, path: &Path) -> Result<PointSet> {
            let buffer = pasture_io::base::read_all::<VectorBuffer, _>(path)
                .map_err(|e| {
                    Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
                })?;
            let layout = buffer.point_layout().clone();

            if !layout.has_attribute(&POSITION_3D) {
                return Err(Error::InvalidData(format!(
                    "{} has no position attribute",
                    path.display()
                )));
            }

            let points: Vec<Point3f> = buffer
                .view_attribute::<Vector3<f64>>(&POSITION_3D)
                .into_iter()
                .map(|p| Point3f::new(p.x as f32, p.y as f32, p.z as f32))
                .collect();
            let mut set = PointSet::from_points(points);

            if layout.has_attribute(&COLOR_RGB) {
                let colors: Vec<[u16; 3]> = buffer
                    .view_attribute::<Vector3<u16>>(&COLOR_RGB)
                    .into_iter()
                    .map(|c| [c.x, c.y, c.z])
                    .collect();
                set.set_colors(widen_colors(&colors))?;
            }

            if layout.has_attribute(&CLASSIFICATION) {
                let labels: Vec<u8> = buffer
                    .view_attribute::<u8>(&CLASSIFICATION)
                    .into_iter()
                    .collect();
                set.set_labels(labels)?;
            }

            info!("Read {} points from {}", set.len(), path.display());
            Ok(set)
        }

        fn save(&self, _set: &PointSet, path: &Path) -> Result<()> {
            Err(Error::UnsupportedFormat(format!(
                "writing {} is not supported",
                path.display()
            )))
        }

        fn format_name(&self) -> &'static str {
            "las"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixteen_bit_colors_are_rescaled() {
        let colors = widen_colors(&[[65535, 65535, 0], [0, 32768, 65535]]);
        assert_eq!(colors, vec![[255, 255, 0], [0, 127, 255]]);
    }

    #[test]
    fn test_eight_bit_colors_are_kept() {
        let colors = widen_colors(&[[10, 255, 300], [1, 2, 3]]);
        assert_eq!(colors, vec![[10, 255, 44], [1, 2, 3]]);
    }
}
