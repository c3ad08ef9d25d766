use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use sweepcore::Spectrum;

/// Writes `freq,inten` rows with a header line.
pub fn write_spectrum(path: &Path, spectrum: &Spectrum) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    writer.write_record(["freq", "inten"])?;
    for (freq, inten) in spectrum.iter() {
        writer
            .write_record([freq.to_string(), inten.to_string()])
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::loader::load_matrix;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn written_spectrum_reloads_with_header_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("spectrum.csv");
        let spectrum = Spectrum {
            freq: array![1.0, 2.5, 4.0],
            inten: array![-0.125, 0.0, 3.75],
        };
        write_spectrum(&path, &spectrum).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("freq,inten\n"));
        let reloaded = load_matrix(&path).unwrap();
        assert_eq!(reloaded.column(0), spectrum.freq);
        assert_eq!(reloaded.column(1), spectrum.inten);
    }
}
