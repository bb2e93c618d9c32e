//! NetCDF-backed source container.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use netcdf::types::{FloatType, IntType, NcVariableType};
use netcdf::AttributeValue;

use super::source::{
    normalize_path, region_of, AttrValue, ChildKind, RawDataset, RawValues, SourceContainer,
};
use crate::error::{Result, StratusError};

/// A [`SourceContainer`] over one open netCDF file.
///
/// The handle is acquired once for the whole ingestion pass and released
/// when this value drops; dereferences during resolution reuse it. The
/// netcdf crate exposes no object/region reference types, so this backend
/// never yields `Reference`-kind buffers.
pub struct NetcdfSource {
    file: netcdf::File,
}

impl std::fmt::Debug for NetcdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetcdfSource").finish_non_exhaustive()
    }
}

impl NetcdfSource {
    /// Open a netCDF file read-only.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StratusError::file_open(
                path.to_path_buf(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ));
        }
        let file = netcdf::open(path).map_err(|e| {
            StratusError::Source(format!("Failed to open {}: {}", path.display(), e))
        })?;
        Ok(Self { file })
    }

    fn variable(&self, path: &str) -> Option<netcdf::Variable<'_>> {
        self.file.variable(normalize_path(path))
    }

    fn group_at(&self, path: &str) -> Option<netcdf::Group<'_>> {
        let mut parts = path.split('/');
        let first = parts.next()?;
        let mut current = self.file.groups().ok()?.find(|g| g.name() == first)?;
        for part in parts {
            current = current.groups().find(|g| g.name() == part)?;
        }
        Some(current)
    }
}

impl SourceContainer for NetcdfSource {
    fn list_children(&self, group_path: &str) -> Result<Vec<(String, ChildKind)>> {
        let path = normalize_path(group_path);
        let mut children = Vec::new();

        if path.is_empty() {
            for var in self.file.variables() {
                children.push((var.name().to_string(), ChildKind::Dataset));
            }
            if let Ok(groups) = self.file.groups() {
                for group in groups {
                    children.push((group.name().to_string(), ChildKind::Group));
                }
            }
            return Ok(children);
        }

        let group = self
            .group_at(path)
            .ok_or_else(|| StratusError::Source(format!("No such group: {}", group_path)))?;
        for var in group.variables() {
            children.push((var.name().to_string(), ChildKind::Dataset));
        }
        for sub in group.groups() {
            children.push((sub.name().to_string(), ChildKind::Group));
        }
        Ok(children)
    }

    fn read_dataset(&self, path: &str) -> Result<RawDataset> {
        let var = self
            .variable(path)
            .ok_or_else(|| StratusError::Source(format!("Variable not found: {}", path)))?;

        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let dim_names: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        let values = read_values(&var)?;

        Ok(RawDataset {
            shape,
            dim_names: Some(dim_names),
            values,
        })
    }

    fn read_attributes(&self, path: &str) -> Result<HashMap<String, AttrValue>> {
        let var = self
            .variable(path)
            .ok_or_else(|| StratusError::Source(format!("Variable not found: {}", path)))?;
        let mut attributes = HashMap::new();
        for attr in var.attributes() {
            attributes.insert(attr.name().to_string(), attr_to_value(&attr));
        }
        Ok(attributes)
    }

    fn child_kind(&self, path: &str) -> Option<ChildKind> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Some(ChildKind::Group);
        }
        if self.variable(path).is_some() {
            return Some(ChildKind::Dataset);
        }
        if self.group_at(path).is_some() {
            return Some(ChildKind::Group);
        }
        None
    }

    fn read_region(&self, path: &str, ranges: &[Range<usize>]) -> Result<RawDataset> {
        let full = self.read_dataset(path)?;
        region_of(&full, ranges)
    }
}

fn read_values(var: &netcdf::Variable<'_>) -> Result<RawValues> {
    let vartype = var.vartype();

    match vartype {
        NcVariableType::Float(FloatType::F64) => {
            let values: Vec<f64> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read f64 data: {}", e)))?;
            Ok(RawValues::Float(values))
        }
        NcVariableType::Float(FloatType::F32) => {
            let values: Vec<f32> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read f32 data: {}", e)))?;
            Ok(RawValues::Float(values.into_iter().map(|x| x as f64).collect()))
        }
        NcVariableType::Int(IntType::I64) => {
            let values: Vec<i64> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read i64 data: {}", e)))?;
            Ok(RawValues::Int(values))
        }
        NcVariableType::Int(IntType::I32) => {
            let values: Vec<i32> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read i32 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Int(IntType::I16) => {
            let values: Vec<i16> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read i16 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Int(IntType::I8) => {
            let values: Vec<i8> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read i8 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Int(IntType::U64) => {
            let values: Vec<u64> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read u64 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Int(IntType::U32) => {
            let values: Vec<u32> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read u32 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Int(IntType::U16) => {
            let values: Vec<u16> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read u16 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Int(IntType::U8) => {
            let values: Vec<u8> = var
                .get_values(..)
                .map_err(|e| StratusError::Source(format!("Failed to read u8 data: {}", e)))?;
            Ok(RawValues::Int(values.into_iter().map(|x| x as i64).collect()))
        }
        NcVariableType::Char | NcVariableType::String => Err(StratusError::Source(
            "Character/string data cannot be read as an array".to_string(),
        )),
        _ => Err(StratusError::Source(format!(
            "Unsupported variable type: {:?}",
            vartype
        ))),
    }
}

fn attr_to_value(attr: &netcdf::Attribute<'_>) -> AttrValue {
    match attr.value() {
        Ok(AttributeValue::Uchar(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Schar(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Ushort(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Short(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Uint(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Int(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Ulonglong(v)) => AttrValue::Int(v as i64),
        Ok(AttributeValue::Longlong(v)) => AttrValue::Int(v),
        Ok(AttributeValue::Float(v)) => AttrValue::Float(v as f64),
        Ok(AttributeValue::Double(v)) => AttrValue::Float(v),
        Ok(AttributeValue::Str(v)) => AttrValue::Text(v),
        Ok(AttributeValue::Uchars(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Schars(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Ushorts(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Shorts(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Uints(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Ints(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Ulonglongs(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Longlongs(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Floats(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Doubles(v)) => AttrValue::Text(format!("{:?}", v)),
        Ok(AttributeValue::Strs(v)) => AttrValue::Text(v.join(", ")),
        Err(_) => AttrValue::Text(format!("{:?}", attr)),
    }
}
