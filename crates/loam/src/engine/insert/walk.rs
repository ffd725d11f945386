use super::IdMode;
use crate::engine::EngineContext;

use loam_core::feature::{Feature, FeatureId, FeatureRef, Property, PropertyValue};
use loam_core::stmt::{Type, Value};
use loam_core::{Error, Result};

use std::collections::HashMap;
use std::sync::Arc;

/// The collected feature graph: every distinct feature, in first-seen
/// (document) order, with lookup by in-memory identity and by id.
pub(crate) struct CollectedGraph {
    pub features: Vec<Feature>,

    /// `Arc` pointer identity → index, for features carried inline.
    by_ptr: HashMap<usize, usize>,

    /// Feature id → index. Ids replaced under `GenerateNew` keep their old
    /// entry so by-id references in the document still resolve.
    by_id: HashMap<FeatureId, usize>,

    /// Indices of the insert roots, in input order.
    pub roots: Vec<usize>,
}

impl CollectedGraph {
    pub(crate) fn index_of(&self, reference: &FeatureRef) -> Option<usize> {
        match reference {
            FeatureRef::Resolved(feature) => self
                .by_ptr
                .get(&(Arc::as_ptr(feature) as usize))
                .or_else(|| feature.id.as_ref().and_then(|id| self.by_id.get(id)))
                .copied(),
            FeatureRef::Unresolved(id) => self.by_id.get(id).copied(),
        }
    }
}

/// Walks the feature graph depth-first, collecting every distinct feature
/// by identity while preserving first-seen order. Features already visited
/// are not re-collected, which makes the traversal safe for cyclic
/// documents.
pub(crate) fn collect(roots: Vec<Feature>) -> CollectedGraph {
    let mut graph = CollectedGraph {
        features: vec![],
        by_ptr: HashMap::new(),
        by_id: HashMap::new(),
        roots: vec![],
    };

    for root in &roots {
        let index = visit(&mut graph, root, None);
        graph.roots.push(index);
    }

    graph
}

fn visit(graph: &mut CollectedGraph, feature: &Feature, ptr: Option<usize>) -> usize {
    if let Some(ptr) = ptr {
        if let Some(&index) = graph.by_ptr.get(&ptr) {
            return index;
        }
    }
    if let Some(id) = &feature.id {
        if let Some(&index) = graph.by_id.get(id) {
            return index;
        }
    }

    let index = graph.features.len();
    graph.features.push(feature.clone());
    if let Some(ptr) = ptr {
        graph.by_ptr.insert(ptr, index);
    }
    if let Some(id) = &feature.id {
        graph.by_id.insert(id.clone(), index);
    }

    visit_properties(graph, &feature.properties);

    index
}

fn visit_properties(graph: &mut CollectedGraph, properties: &[Property]) {
    for property in properties {
        match &property.value {
            PropertyValue::Feature(FeatureRef::Resolved(sub)) => {
                visit(graph, sub, Some(Arc::as_ptr(sub) as usize));
            }
            PropertyValue::Complex(children) => visit_properties(graph, children),
            _ => {}
        }
    }
}

/// Assigns ids per the selected mode: `GenerateNew` replaces every id,
/// `UseExisting` only fills gaps. Geometries are treated the same way.
/// Returns the root features' ids in input order.
pub(crate) fn assign_ids(
    cx: &EngineContext,
    graph: &mut CollectedGraph,
    mode: IdMode,
) -> Result<Vec<FeatureId>> {
    for index in 0..graph.features.len() {
        let type_name = graph.features[index].type_name.clone();
        let mapping = cx.schema.feature_type(&type_name)?;

        let replace = mode == IdMode::GenerateNew;
        let feature = &mut graph.features[index];

        if replace || feature.id.is_none() {
            let kernel = fresh_kernel(mapping.fid.ty)?;
            let id = mapping.fid.format_id(&kernel);
            feature.id = Some(id.clone());
            graph.by_id.insert(id, index);
        } else if let Some(id) = &feature.id {
            graph.by_id.entry(id.clone()).or_insert(index);
        }

        assign_geometry_ids(&mut graph.features[index].properties, replace);
    }

    Ok(graph
        .roots
        .iter()
        .map(|&index| graph.features[index].id.clone().unwrap())
        .collect())
}

fn assign_geometry_ids(properties: &mut [Property], replace: bool) {
    for property in properties.iter_mut() {
        match &mut property.value {
            PropertyValue::Geometry(geometry) => {
                if replace || geometry.id.is_none() {
                    geometry.id = Some(uuid::Uuid::new_v4().simple().to_string());
                }
            }
            PropertyValue::Complex(children) => assign_geometry_ids(children, replace),
            _ => {}
        }
    }
}

/// A fresh id-kernel for the given fid value type.
fn fresh_kernel(ty: Type) -> Result<Value> {
    let uuid = uuid::Uuid::new_v4();
    Ok(match ty {
        Type::Text => Value::String(uuid.simple().to_string()),
        Type::I64 => Value::I64((uuid.as_u128() as u64 >> 1) as i64),
        Type::I32 => Value::I32((uuid.as_u128() as u32 >> 1) as i32),
        other => {
            return Err(Error::invalid_schema(format!(
                "cannot generate ids for fid type `{other}`"
            )))
        }
    })
}
