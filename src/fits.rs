// src/fits.rs

use anyhow::{Context, Result, bail};
use fitsio::FitsFile;
use fitsio::hdu::{FitsHdu, HduInfo};
use ndarray::Array2;
use std::path::Path;

/// World coordinate keywords found in the primary header.
///
/// Carried alongside the pixels for reference only; cropping and masking work
/// purely in pixel space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WcsHeader {
    pub ctype: [Option<String>; 2],
    pub crval: [Option<f64>; 2],
    pub crpix: [Option<f64>; 2],
    pub cdelt: [Option<f64>; 2],
}

impl WcsHeader {
    fn is_empty(&self) -> bool {
        self == &WcsHeader::default()
    }
}

/// 加载后的二维图像
#[derive(Debug, Clone)]
pub struct FitsImage {
    /// Indexed `[row, col]`, i.e. `[y, x]`.
    pub data: Array2<f64>,
    pub wcs: Option<WcsHeader>,
}

impl FitsImage {
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }
}

/// Load the primary HDU of a FITS file as a 2D `f64` array.
pub fn load_fits(path: &Path) -> Result<FitsImage> {
    let mut fptr = FitsFile::open(path)
        .with_context(|| format!("Failed to open FITS file: {}", path.display()))?;

    let hdu = fptr.primary_hdu().context("Failed to access primary HDU")?;

    // shape comes back as [NAXIS2, NAXIS1] = [rows, cols]
    let shape = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => shape.clone(),
        HduInfo::TableInfo { .. } => bail!("Primary HDU is a table, not an image"),
        HduInfo::AnyInfo => bail!("Unknown HDU type"),
    };
    let (rows, cols) = match shape.as_slice() {
        [rows, cols] => (*rows, *cols),
        dims => bail!("Expected a 2D image, found {} axes", dims.len()),
    };

    let pixels: Vec<f64> = hdu
        .read_image(&mut fptr)
        .context("Failed to read image data")?;
    let data = Array2::from_shape_vec((rows, cols), pixels)
        .context("Pixel count does not match image shape")?;

    let wcs = read_wcs(&hdu, &mut fptr);
    if let Some(wcs) = &wcs {
        log::debug!("WCS header: {:?}", wcs);
    }

    Ok(FitsImage { data, wcs })
}

fn read_wcs(hdu: &FitsHdu, fptr: &mut FitsFile) -> Option<WcsHeader> {
    let wcs = WcsHeader {
        ctype: [
            read_key_optional(hdu, fptr, "CTYPE1"),
            read_key_optional(hdu, fptr, "CTYPE2"),
        ],
        crval: [
            read_key_optional(hdu, fptr, "CRVAL1"),
            read_key_optional(hdu, fptr, "CRVAL2"),
        ],
        crpix: [
            read_key_optional(hdu, fptr, "CRPIX1"),
            read_key_optional(hdu, fptr, "CRPIX2"),
        ],
        cdelt: [
            read_key_optional(hdu, fptr, "CDELT1"),
            read_key_optional(hdu, fptr, "CDELT2"),
        ],
    };
    (!wcs.is_empty()).then_some(wcs)
}

fn read_key_optional<T: fitsio::headers::ReadsKey>(
    hdu: &FitsHdu,
    fptr: &mut FitsFile,
    key: &str,
) -> Option<T> {
    hdu.read_key(fptr, key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitsio::images::{ImageDescription, ImageType};
    use tempfile::tempdir;

    fn write_test_fits(path: &Path, rows: usize, cols: usize, with_wcs: bool) {
        let description = ImageDescription {
            data_type: ImageType::Double,
            dimensions: &[rows, cols],
        };
        let mut fptr = FitsFile::create(path)
            .with_custom_primary(&description)
            .open()
            .unwrap();
        let hdu = fptr.primary_hdu().unwrap();
        let pixels: Vec<f64> = (0..rows * cols).map(|i| i as f64 * 0.5).collect();
        hdu.write_image(&mut fptr, &pixels).unwrap();
        if with_wcs {
            hdu.write_key(&mut fptr, "CTYPE1", "RA---TAN").unwrap();
            hdu.write_key(&mut fptr, "CRVAL1", 150.25).unwrap();
            hdu.write_key(&mut fptr, "CRPIX2", 2.0).unwrap();
        }
    }

    #[test]
    fn loads_pixels_row_major() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.fits");
        write_test_fits(&path, 3, 4, false);

        let image = load_fits(&path).unwrap();
        assert_eq!(image.data.dim(), (3, 4));
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.data[(0, 1)], 0.5);
        assert_eq!(image.data[(2, 3)], 5.5);
        assert!(image.wcs.is_none());
    }

    #[test]
    fn reads_wcs_keywords_when_present() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wcs.fits");
        write_test_fits(&path, 2, 2, true);

        let wcs = load_fits(&path).unwrap().wcs.unwrap();
        assert_eq!(wcs.ctype[0].as_deref(), Some("RA---TAN"));
        assert_eq!(wcs.ctype[1], None);
        assert_eq!(wcs.crval[0], Some(150.25));
        assert_eq!(wcs.crpix[1], Some(2.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_fits(&dir.path().join("nope.fits")).is_err());
    }
}
