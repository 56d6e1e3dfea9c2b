use std::{
    fmt,
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::{
    decoder::{decode, RomAddress, ROM_SIZE},
    error::ImageError,
    polarity::ElectricalWord,
};

/// One of the two EEPROMs wired in parallel on the data bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Half {
    /// Control word bits 0-7
    Low,
    /// Control word bits 8-15
    High,
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::Low => f.write_str("low"),
            Half::High => f.write_str("high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum ImageFormat {
    /// Raw bytes, ready for the programmer
    #[default]
    Binary,
    /// One two-digit hex byte per line
    Hex,
}

impl ImageFormat {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            ImageFormat::Binary => "bin",
            ImageFormat::Hex => "hex",
        }
    }

    fn write_byte<W: Write>(self, out: &mut W, byte: u8) -> std::io::Result<()> {
        match self {
            ImageFormat::Binary => out.write_all(&[byte]),
            ImageFormat::Hex => writeln!(out, "{:02X}", byte),
        }
    }
}

/// Splits control words across the low and high EEPROM images.
///
/// Byte `i` of each stream belongs to address `i`, so words must be pushed in
/// address order.
pub(crate) struct ImageWriter<W: Write> {
    low: W,
    high: W,
    format: ImageFormat,
    written: usize,
}

impl<W: Write> ImageWriter<W> {
    pub(crate) fn new(low: W, high: W, format: ImageFormat) -> Self {
        ImageWriter {
            low,
            high,
            format,
            written: 0,
        }
    }

    pub(crate) fn push(&mut self, word: ElectricalWord) -> Result<(), ImageError> {
        self.format
            .write_byte(&mut self.low, word.low())
            .map_err(ImageError::stream(Half::Low))?;
        self.format
            .write_byte(&mut self.high, word.high())
            .map_err(ImageError::stream(Half::High))?;
        self.written += 1;
        Ok(())
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    /// Flushes both streams and hands them back. Fails unless exactly one
    /// word per ROM address was pushed.
    pub(crate) fn finish(mut self) -> Result<(W, W), ImageError> {
        if self.written != ROM_SIZE {
            return Err(ImageError::Incomplete {
                written: self.written,
                expected: ROM_SIZE,
            });
        }
        self.low.flush().map_err(ImageError::stream(Half::Low))?;
        self.high.flush().map_err(ImageError::stream(Half::High))?;
        Ok((self.low, self.high))
    }
}

/// Decodes every address in order and writes both images
pub(crate) fn write_images<W: Write>(
    low: W,
    high: W,
    format: ImageFormat,
) -> Result<(W, W), ImageError> {
    let mut writer = ImageWriter::new(low, high, format);
    for address in RomAddress::all() {
        writer.push(decode(address))?;
    }
    debug!("Encoded {} words", writer.written());
    writer.finish()
}

/// Paths of the low and high images for `prefix`, e.g. `ee0.bin` and `ee1.bin`
pub(crate) fn image_paths(prefix: &str, format: ImageFormat) -> (PathBuf, PathBuf) {
    let path = |i: usize| PathBuf::from(format!("{}{}.{}", prefix, i, format.extension()));
    (path(0), path(1))
}

/// Writes both image files.
///
/// Each image is built in a temporary file next to its target and only
/// renamed into place once both are complete, so a failed run leaves any
/// existing images untouched.
pub(crate) fn write_image_files(
    prefix: &str,
    format: ImageFormat,
) -> Result<(PathBuf, PathBuf), ImageError> {
    let (low_path, high_path) = image_paths(prefix, format);

    let low = staging_file(&low_path)?;
    let high = staging_file(&high_path)?;
    let (low, high) = write_images(BufWriter::new(low), BufWriter::new(high), format)
        .map_err(|e| e.with_paths(&low_path, &high_path))?;
    let low = finish_staging(low, &low_path)?;
    let high = finish_staging(high, &high_path)?;

    let low_existed = low_path.exists();
    persist(low, &low_path)?;
    if let Err(e) = persist(high, &high_path) {
        if low_existed {
            warn!(
                "'{}' was replaced but '{}' was not",
                low_path.display(),
                high_path.display()
            );
        } else {
            warn!("Removing unpaired image '{}'", low_path.display());
            if let Err(remove) = fs::remove_file(&low_path) {
                warn!("Could not remove '{}': {}", low_path.display(), remove);
            }
        }
        return Err(e);
    }

    info!(
        "Wrote {} and {} ({} bytes each)",
        low_path.display(),
        high_path.display(),
        ROM_SIZE
    );
    Ok((low_path, high_path))
}

fn staging_file(target: &Path) -> Result<NamedTempFile, ImageError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|source| ImageError::Create {
        path: target.to_path_buf(),
        source,
    })
}

fn finish_staging(
    out: BufWriter<NamedTempFile>,
    target: &Path,
) -> Result<NamedTempFile, ImageError> {
    out.into_inner().map_err(|e| ImageError::Write {
        path: target.to_path_buf(),
        source: e.into_error(),
    })
}

fn persist(file: NamedTempFile, target: &Path) -> Result<(), ImageError> {
    file.persist(target).map_err(|e| ImageError::Write {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
