//! Scoped GeoTIFF reading
//!
//! A [`RasterSource`] owns the open file (through the `tiff` decoder) from
//! `open` until it is dropped or closed. Reads go through the source, so
//! nothing can touch the file once the source is gone.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::io::tags;
use crate::metadata::RasterMetadata;
use crate::raster::{MaskedRaster, MultiBandRaster, Raster};
use ndarray::Array3;
use num_traits::ToPrimitive;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tracing::debug;

/// An open GeoTIFF.
///
/// Header and GeoTIFF tags are parsed on open; pixel data is decoded on the
/// first band read and shared by later reads. The handle is released when
/// the source is dropped, on every exit path.
pub struct RasterSource<R: Read + Seek = BufReader<File>> {
    decoder: Decoder<R>,
    name: String,
    metadata: RasterMetadata,
    samples: Option<Vec<f64>>,
}

impl RasterSource {
    /// Open a GeoTIFF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path.display().to_string())
    }
}

impl<'a> RasterSource<Cursor<&'a [u8]>> {
    /// Open a GeoTIFF held in memory
    pub fn from_buffer(data: &'a [u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data), "<buffer>")
    }
}

impl<R: Read + Seek> RasterSource<R> {
    /// Open a GeoTIFF from any `Read + Seek` source. `name` labels log events.
    pub fn from_reader(reader: R, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut decoder = Decoder::new(reader)?.with_limits(Limits::unlimited());

        let (width, height) = decoder.dimensions()?;
        let layout = tags::read_layout(&mut decoder)?;
        let metadata = RasterMetadata {
            width: width as usize,
            height: height as usize,
            band_count: layout.samples_per_pixel,
            data_type: layout.data_type,
            nodata: tags::read_nodata(&mut decoder).map(|v| layout.data_type.narrow(v)),
            transform: tags::read_geotransform(&mut decoder).unwrap_or_default(),
            crs: tags::read_epsg(&mut decoder).map(CRS::from_epsg),
        };

        debug!(
            source = %name,
            width,
            height,
            bands = metadata.band_count,
            "acquired raster handle"
        );

        Ok(Self {
            decoder,
            name,
            metadata,
            samples: None,
        })
    }

    pub fn metadata(&self) -> &RasterMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read one band (0-based) as a plain raster. The no-data sentinel stays
    /// in the data and is recorded as the raster's no-data value.
    pub fn read_band(&mut self, band: usize) -> Result<Raster<f64>> {
        let count = self.metadata.band_count;
        if band >= count {
            return Err(Error::BandOutOfRange { band, count });
        }

        let (rows, cols) = self.metadata.shape();
        let samples = self.decoded_samples()?;
        let data: Vec<f64> = samples.iter().skip(band).step_by(count).copied().collect();

        let mut raster = Raster::from_vec(data, rows, cols)?;
        raster.set_transform(self.metadata.transform);
        raster.set_crs(self.metadata.crs);
        raster.set_nodata(self.metadata.nodata);
        Ok(raster)
    }

    /// Read one band with no-data cells excluded
    pub fn read_band_masked(&mut self, band: usize) -> Result<MaskedRaster> {
        self.read_band(band).map(MaskedRaster::from_raster)
    }

    /// Read several bands, each with no-data cells excluded
    pub fn read_bands(&mut self, bands: &[usize]) -> Result<Vec<MaskedRaster>> {
        bands.iter().map(|&b| self.read_band_masked(b)).collect()
    }

    /// Read every band into a (band, row, col) stack
    pub fn read_all(&mut self) -> Result<MultiBandRaster> {
        let (rows, cols) = self.metadata.shape();
        let count = self.metadata.band_count;
        let samples = self.decoded_samples()?.to_vec();

        let interleaved = Array3::from_shape_vec((rows, cols, count), samples)
            .map_err(|e| Error::Other(e.to_string()))?;
        let stacked = interleaved
            .permuted_axes([2, 0, 1])
            .as_standard_layout()
            .into_owned();

        let mut raster = MultiBandRaster::new(stacked);
        raster.set_transform(self.metadata.transform);
        raster.set_crs(self.metadata.crs);
        raster.set_nodata(self.metadata.nodata);
        Ok(raster)
    }

    /// Run `f` against this source, then release it whether `f` succeeded or not
    pub fn scoped<T, F>(mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let result = f(&mut self);
        self.close();
        result
    }

    /// Release the file handle now
    pub fn close(self) {}

    fn decoded_samples(&mut self) -> Result<&[f64]> {
        let (rows, cols) = self.metadata.shape();
        let expected = rows * cols * self.metadata.band_count;

        let samples = match &mut self.samples {
            Some(samples) => samples,
            slot @ None => {
                let decoded = decode_samples(&mut self.decoder)?;
                if decoded.len() != expected {
                    return Err(Error::InvalidDimensions {
                        width: cols,
                        height: rows,
                    });
                }
                debug!(source = %self.name, samples = decoded.len(), "decoded pixel data");
                slot.insert(decoded)
            }
        };
        Ok(samples.as_slice())
    }
}

impl<R: Read + Seek> Drop for RasterSource<R> {
    fn drop(&mut self) {
        debug!(source = %self.name, "released raster handle");
    }
}

fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f64>> {
    let samples = match decoder.read_image()? {
        DecodingResult::U8(buf) => widen(buf),
        DecodingResult::U16(buf) => widen(buf),
        DecodingResult::U32(buf) => widen(buf),
        DecodingResult::U64(buf) => widen(buf),
        DecodingResult::I8(buf) => widen(buf),
        DecodingResult::I16(buf) => widen(buf),
        DecodingResult::I32(buf) => widen(buf),
        DecodingResult::I64(buf) => widen(buf),
        DecodingResult::F32(buf) => widen(buf),
        DecodingResult::F64(buf) => buf,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };
    Ok(samples)
}

fn widen<V: ToPrimitive>(buf: Vec<V>) -> Vec<f64> {
    buf.into_iter()
        .map(|v| v.to_f64().unwrap_or(f64::NAN))
        .collect()
}

/// Open `path`, run `f` against the source, and release the handle before
/// returning, including when `f` fails.
///
/// # Example
/// ```no_run
/// use geolab_core::io::with_raster;
///
/// let (dtm, meta) = with_raster("pre_DTM.tif", |src| {
///     Ok((src.read_band_masked(0)?, src.metadata().clone()))
/// })?;
/// # Ok::<(), geolab_core::Error>(())
/// ```
pub fn with_raster<P, T, F>(path: P, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&mut RasterSource) -> Result<T>,
{
    RasterSource::open(path)?.scoped(f)
}

/// Read a single band (default: the first) from a GeoTIFF file
pub fn read_geotiff<P: AsRef<Path>>(path: P, band: Option<usize>) -> Result<Raster<f64>> {
    with_raster(path, |src| src.read_band(band.unwrap_or(0)))
}

/// Read a single band with no-data cells excluded, plus the file metadata
pub fn read_geotiff_masked<P: AsRef<Path>>(
    path: P,
    band: Option<usize>,
) -> Result<(MaskedRaster, RasterMetadata)> {
    with_raster(path, |src| {
        let raster = src.read_band_masked(band.unwrap_or(0))?;
        Ok((raster, src.metadata().clone()))
    })
}

/// Read all bands of a GeoTIFF file, plus the file metadata
pub fn read_geotiff_bands<P: AsRef<Path>>(path: P) -> Result<(MultiBandRaster, RasterMetadata)> {
    with_raster(path, |src| {
        let raster = src.read_all()?;
        Ok((raster, src.metadata().clone()))
    })
}

/// Read a single band from an in-memory GeoTIFF
pub fn read_geotiff_from_buffer(data: &[u8], band: Option<usize>) -> Result<Raster<f64>> {
    RasterSource::from_buffer(data)?.scoped(|src| src.read_band(band.unwrap_or(0)))
}
