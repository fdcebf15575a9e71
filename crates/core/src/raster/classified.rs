//! Integer-labelled rasters produced by binning continuous values

use crate::error::{Error, Result};
use crate::raster::{Mask, Raster};
use std::collections::BTreeMap;

/// Class labels over a grid plus the cells that had no data to classify.
///
/// "Has data" and "in range" are independent properties of a cell: a masked
/// cell has no label at all, while a valid cell below the first boundary gets
/// label 0 and a valid cell at or above the last boundary gets
/// `boundary_count`. Only labels in `1..boundary_count` are in range.
#[derive(Debug, Clone)]
pub struct ClassifiedRaster {
    labels: Raster<u16>,
    mask: Mask,
    boundary_count: usize,
}

impl ClassifiedRaster {
    pub fn new(labels: Raster<u16>, mask: Mask, boundary_count: usize) -> Result<Self> {
        if labels.shape() != mask.shape() {
            return Err(Error::size_mismatch(labels.shape(), mask.shape()));
        }
        Ok(Self {
            labels,
            mask,
            boundary_count,
        })
    }

    pub fn labels(&self) -> &Raster<u16> {
        &self.labels
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn shape(&self) -> (usize, usize) {
        self.labels.shape()
    }

    /// Number of boundaries the raster was binned with
    pub fn boundary_count(&self) -> usize {
        self.boundary_count
    }

    /// Label at (row, col), `None` for cells without data
    pub fn label(&self, row: usize, col: usize) -> Result<Option<u16>> {
        let label = self.labels.get(row, col)?;
        Ok((!self.mask.is_excluded(row, col)).then_some(label))
    }

    pub fn has_data(&self, row: usize, col: usize) -> bool {
        !self.mask.is_excluded(row, col)
    }

    /// Whether the cell has data and falls between the first and last boundary
    pub fn in_range(&self, row: usize, col: usize) -> bool {
        match self.label(row, col) {
            Ok(Some(label)) => label >= 1 && (label as usize) < self.boundary_count,
            _ => false,
        }
    }

    /// Distinct labels of cells with data, ascending
    pub fn unique_labels(&self) -> Vec<u16> {
        self.class_counts().into_keys().collect()
    }

    /// Cell count per label, cells without data not included
    pub fn class_counts(&self) -> BTreeMap<u16, usize> {
        let mut counts = BTreeMap::new();
        for (&label, &excluded) in self.labels.data().iter().zip(self.mask.as_array().iter()) {
            if !excluded {
                *counts.entry(label).or_insert(0) += 1;
            }
        }
        counts
    }
}
