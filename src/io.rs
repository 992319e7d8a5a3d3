//! Writing particles to disk, either as a plain text position dump (a count line followed by
//! one `x y` line per particle, 5 significant figures) or as a MessagePack snapshot of the
//! whole particle set.
use crate::math::*;
use crate::particles::ParticleSet;
use eyre::WrapErr;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Significant figures written per coordinate in the text dump.
pub const SIGNIFICANT_FIGURES: usize = 5;

/// Builds the path of each frame's output file: `<directory>/<stem><frame:04>.<extension>`.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePattern {
    pub directory: PathBuf,
    pub stem: String,
    pub extension: String,
}

impl FramePattern {
    pub fn new(
        directory: impl Into<PathBuf>,
        stem: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        FramePattern {
            directory: directory.into(),
            stem: stem.into(),
            extension: extension.into(),
        }
    }

    /// The pattern for text dumps, `frameparticles0000.txt`, ...
    pub fn text(directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, "frameparticles", "txt")
    }

    /// The pattern for binary snapshots, `frameparticles0000.msgpack`, ...
    pub fn snapshot(directory: impl Into<PathBuf>) -> Self {
        Self::new(directory, "frameparticles", "msgpack")
    }

    pub fn path(&self, frame: usize) -> PathBuf {
        let mut path = self.directory.clone();
        path.push(format!("{}{:04}.{}", self.stem, frame, self.extension));
        path
    }
}

/// Formats `x` like C's `%.<precision>g`: `precision` significant figures, trailing zeros
/// removed, switching to exponent notation for very large or small magnitudes.
pub fn format_general(x: T, precision: usize) -> String {
    if !x.is_finite() {
        return if x.is_nan() {
            "nan".to_string()
        } else if x > 0. {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }

    let precision = precision.max(1);
    // Rounding to `precision` figures first decides which notation is used.
    let scientific = format!("{:.*e}", precision - 1, x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl ParticleSet {
    /// Writes the particle count followed by the position of each particle, one per line.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .wrap_err_with(|| format!("Failed to create particle file: {:?}", path))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", self.count())?;
        for x in &self.positions {
            writeln!(
                writer,
                "{} {}",
                format_general(x.x, SIGNIFICANT_FIGURES),
                format_general(x.y, SIGNIFICANT_FIGURES)
            )?;
        }
        writer
            .flush()
            .wrap_err_with(|| format!("Failed to write particle file: {:?}", path))?;

        tracing::debug!(?path, particles = self.count(), "wrote particle positions");
        Ok(())
    }

    /// Writes the full particle set (positions and velocities) as MessagePack.
    pub fn write_snapshot(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(
            File::create(path)
                .wrap_err_with(|| format!("Failed to create snapshot: {:?}", path))?,
        );
        rmp_serde::encode::write(&mut writer, self)
            .wrap_err_with(|| format!("Failed to encode snapshot: {:?}", path))?;
        writer.flush()?;

        tracing::debug!(?path, particles = self.count(), "wrote particle snapshot");
        Ok(())
    }

    /// Reads a particle set written by `write_snapshot`.
    pub fn read_snapshot(path: impl AsRef<Path>) -> eyre::Result<ParticleSet> {
        let path = path.as_ref();
        let reader = BufReader::new(
            File::open(path).wrap_err_with(|| format!("Failed to open snapshot: {:?}", path))?,
        );
        let particles: ParticleSet = rmp_serde::decode::from_read(reader)
            .wrap_err_with(|| format!("Failed to decode snapshot: {:?}", path))?;

        eyre::ensure!(
            particles.is_consistent(),
            "Snapshot {:?} has {} positions but {} velocities",
            path,
            particles.positions.len(),
            particles.velocities.len()
        );
        Ok(particles)
    }
}

/// Reads back the positions written by `ParticleSet::write_to_file`.
pub fn read_positions(path: impl AsRef<Path>) -> eyre::Result<Vec<TV>> {
    let path = path.as_ref();
    let file =
        File::open(path).wrap_err_with(|| format!("Failed to open particle file: {:?}", path))?;
    let mut lines = BufReader::new(file).lines();

    let count: usize = match lines.next() {
        Some(line) => line?
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid particle count in {:?}", path))?,
        None => return Err(eyre::eyre!("Particle file {:?} is empty", path)),
    };

    let mut positions = Vec::new();
    for (n, line) in lines.enumerate().take(count) {
        let line = line?;
        let mut coords = line.split_whitespace().map(str::parse::<T>);
        match (coords.next(), coords.next()) {
            (Some(Ok(x)), Some(Ok(y))) => positions.push(TV::new(x, y)),
            _ => {
                return Err(eyre::eyre!(
                    "Malformed particle on line {} of {:?}: {:?}",
                    n + 2,
                    path,
                    line
                ))
            }
        }
    }

    eyre::ensure!(
        positions.len() == count,
        "Particle file {:?} announces {} particles but contains {}",
        path,
        count,
        positions.len()
    );
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("pic_core_{}_{}", std::process::id(), name));
        path
    }

    #[test]
    fn frame_pattern() {
        let pattern = FramePattern::text("out");
        assert_eq!(pattern.path(7), Path::new("out/frameparticles0007.txt"));
        assert_eq!(
            FramePattern::new("a", "p", "dat").path(12345),
            Path::new("a/p12345.dat")
        );
    }

    #[test]
    fn general_format_matches_c() {
        assert_eq!(format_general(0., 5), "0");
        assert_eq!(format_general(1., 5), "1");
        assert_eq!(format_general(0.5, 5), "0.5");
        assert_eq!(format_general(1.234567, 5), "1.2346");
        assert_eq!(format_general(-12.5, 5), "-12.5");
        assert_eq!(format_general(12345.6, 5), "12346");
        assert_eq!(format_general(123456., 5), "1.2346e+05");
        assert_eq!(format_general(99999.9, 5), "1e+05");
        assert_eq!(format_general(0.0001, 5), "0.0001");
        assert_eq!(format_general(0.00001234, 5), "1.234e-05");
        assert_eq!(format_general(T::NAN, 5), "nan");
    }

    proptest! {
        #[test]
        fn general_format_keeps_five_figures(x in -1e6f32..1e6) {
            let parsed: T = format_general(x, 5).parse().unwrap();
            prop_assert!((parsed - x).abs() <= 1e-4 * x.abs() + 1e-30);
        }
    }

    #[test]
    fn text_dump_round_trip() {
        let mut particles = ParticleSet::new();
        for (i, x) in crate::linspace(0.1, 9.9, 50).enumerate() {
            let y = 5. + (x * 1.37).sin() * 3.;
            particles.add_particle(TV::new(x as T, y as T), TV::new(i as T, 0.));
        }

        let path = temp_path("text_dump_round_trip.txt");
        particles.write_to_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().next(), Some("50"));
        assert_eq!(contents.lines().count(), 51);

        let positions = read_positions(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(positions.len(), particles.count());
        for (read, original) in positions.iter().zip(particles.positions()) {
            assert!((read - original).abs().max() <= 1e-4 * original.abs().max());
        }
    }

    #[test]
    fn read_rejects_truncated_dump() {
        let path = temp_path("truncated.txt");
        std::fs::write(&path, "3\n1 2\n3 4\n").unwrap();
        let result = read_positions(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn read_rejects_oversized_count() {
        let path = temp_path("oversized_count.txt");
        std::fs::write(&path, format!("{}\n1 2\n", usize::MAX)).unwrap();
        let result = read_positions(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let particles = ParticleSet::new();
        let mut path = temp_path("missing_directory");
        path.push("particles.txt");

        assert!(particles.write_to_file(&path).is_err());
    }

    #[test]
    fn snapshot_round_trip() {
        let mut particles = ParticleSet::new();
        particles.add_particle(TV::new(1.25, 2.5), TV::new(-0.5, 3.));
        particles.add_particle(TV::new(0.1, 0.2), TV::new(0.3, 0.4));

        let path = temp_path("snapshot_round_trip.msgpack");
        particles.write_snapshot(&path).unwrap();
        let read = ParticleSet::read_snapshot(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(read, particles);
    }

    #[test]
    fn snapshot_with_mismatched_lengths_is_rejected() {
        let broken = ParticleSet {
            positions: vec![TV::zeros(); 3],
            velocities: vec![TV::zeros(); 2],
        };

        let path = temp_path("broken.msgpack");
        broken.write_snapshot(&path).unwrap();
        let result = ParticleSet::read_snapshot(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
