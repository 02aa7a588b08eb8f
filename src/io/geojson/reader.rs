use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use arrow_array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow_schema::{DataType, Field, FieldRef};
use geojson::FeatureCollection;
use serde_json::Value;

use crate::array::from_geometries;
use crate::error::Result;
use crate::table::GeoTable;

/// The Arrow type a property column will be read as.
///
/// Inference widens as values are observed: integers stay `Int64` until a float shows
/// up, and any other disagreement falls back to `Utf8` (non-scalar JSON values are
/// stored as their JSON text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyType {
    Bool,
    Int,
    Float,
    Utf8,
}

impl PropertyType {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Bool),
            Value::Number(n) if n.is_f64() => Some(Self::Float),
            Value::Number(_) => Some(Self::Int),
            _ => Some(Self::Utf8),
        }
    }

    fn widen(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Utf8,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            Self::Bool => DataType::Boolean,
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
            Self::Utf8 => DataType::Utf8,
        }
    }
}

fn infer_property_types(collection: &FeatureCollection) -> BTreeMap<String, PropertyType> {
    let mut types: BTreeMap<String, PropertyType> = BTreeMap::new();
    for feature in &collection.features {
        let Some(properties) = &feature.properties else {
            continue;
        };
        for (key, value) in properties {
            let Some(observed) = PropertyType::of(value) else {
                continue;
            };
            types
                .entry(key.clone())
                .and_modify(|current| *current = current.widen(observed))
                .or_insert(observed);
        }
    }
    types
}

fn property_value<'a>(feature: &'a geojson::Feature, key: &str) -> Option<&'a Value> {
    feature
        .properties
        .as_ref()
        .and_then(|properties| properties.get(key))
        .filter(|value| !value.is_null())
}

fn build_column(
    collection: &FeatureCollection,
    key: &str,
    property_type: PropertyType,
) -> ArrayRef {
    match property_type {
        PropertyType::Bool => {
            let values: Vec<Option<bool>> = collection
                .features
                .iter()
                .map(|f| property_value(f, key).and_then(|v| v.as_bool()))
                .collect();
            Arc::new(BooleanArray::from(values))
        }
        PropertyType::Int => {
            let values: Vec<Option<i64>> = collection
                .features
                .iter()
                .map(|f| property_value(f, key).and_then(|v| v.as_i64()))
                .collect();
            Arc::new(Int64Array::from(values))
        }
        PropertyType::Float => {
            let values: Vec<Option<f64>> = collection
                .features
                .iter()
                .map(|f| property_value(f, key).and_then(|v| v.as_f64()))
                .collect();
            Arc::new(Float64Array::from(values))
        }
        PropertyType::Utf8 => {
            let values: Vec<Option<String>> = collection
                .features
                .iter()
                .map(|f| {
                    property_value(f, key).map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            Arc::new(StringArray::from(values))
        }
    }
}

/// Read a GeoJSON `FeatureCollection` into a [GeoTable].
///
/// The geometry family is decided by the first non-null geometry; features of another
/// family are an error. Property columns are typed by inference over all features, with
/// missing properties becoming nulls. Column order is by property name.
pub fn read_geojson<R: Read>(reader: R) -> Result<GeoTable> {
    let collection: FeatureCollection = serde_json::from_reader(reader)?;

    let property_types = infer_property_types(&collection);
    let mut fields: Vec<FieldRef> = Vec::with_capacity(property_types.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(property_types.len());
    for (key, property_type) in &property_types {
        fields.push(Field::new(key, property_type.data_type(), true).into());
        columns.push(build_column(&collection, key, *property_type));
    }

    let geoms = collection
        .features
        .iter()
        .map(|feature| {
            feature
                .geometry
                .as_ref()
                .map(|geometry| geo::Geometry::try_from(geometry.value.clone()))
                .transpose()
        })
        .collect::<std::result::Result<Vec<_>, geojson::Error>>()?;
    let geometry = from_geometries(&geoms, Default::default())?;

    GeoTable::from_arrow_and_geometry(fields, columns, geometry)
}

#[cfg(test)]
mod test {
    use arrow_array::Array;

    use super::*;
    use crate::datatypes::GeoDataType;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                "properties": {"name": "first", "population": 10, "score": 1}
            },
            {
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [3.0, 4.0]},
                "properties": {"name": "second", "score": 2.5}
            }
        ]
    }"#;

    #[test]
    fn reads_points_and_properties() {
        let table = read_geojson(COLLECTION.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.geometry_data_type().unwrap(), GeoDataType::Point);

        let schema = table.schema();
        assert_eq!(schema.field_with_name("name").unwrap().data_type(), &DataType::Utf8);
        assert_eq!(
            schema.field_with_name("population").unwrap().data_type(),
            &DataType::Int64
        );
    }

    #[test]
    fn int_widens_to_float_on_conflict() {
        let table = read_geojson(COLLECTION.as_bytes()).unwrap();
        let schema = table.schema();
        assert_eq!(
            schema.field_with_name("score").unwrap().data_type(),
            &DataType::Float64
        );
    }

    #[test]
    fn missing_property_becomes_null() {
        let table = read_geojson(COLLECTION.as_bytes()).unwrap();
        let schema = table.schema();
        let population_index = schema.index_of("population").unwrap();
        let column = table.batches()[0].column(population_index);
        assert!(column.is_null(1));
    }

    #[test]
    fn mixed_geometry_families_rejected() {
        let mixed = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                    "properties": {}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]},
                    "properties": {}
                }
            ]
        }"#;
        assert!(read_geojson(mixed.as_bytes()).is_err());
    }
}
