use super::{RelationalPlan, ValuePlan};
use crate::engine::EngineContext;
use loam_core::driver::{Connection, Row};
use loam_core::feature::{Feature, FeatureRef, Property, PropertyValue};
use loam_core::{Error, Result};

use std::sync::Arc;

pub(crate) struct RelationalMaterializer {
    cx: EngineContext,
    plan: RelationalPlan,
}

impl RelationalMaterializer {
    pub(crate) fn new(cx: EngineContext, plan: RelationalPlan) -> RelationalMaterializer {
        RelationalMaterializer { cx, plan }
    }

    pub(crate) fn build_feature(
        &self,
        conn: &mut dyn Connection,
        mut row: Row,
    ) -> Result<Arc<Feature>> {
        let mapping = self.cx.schema.feature_type(&self.plan.type_name)?;

        let kernel = row.get(0).clone();
        if kernel.is_null() {
            return Err(Error::codec(format!(
                "result row for `{}` has a null fid",
                self.plan.type_name
            )));
        }
        let fid = mapping.fid.format_id(&kernel);

        let mut feature = Feature::new(self.plan.type_name.clone()).with_id(fid);

        for (name, plan) in &self.plan.properties {
            match plan {
                ValuePlan::Joined { index } => {
                    let joined = &self.plan.joined[*index];
                    let mut params = joined.params.clone();
                    *params.last_mut().unwrap() = kernel.clone();
                    let rows = conn.query(&joined.sql, &params, &joined.tys)?;
                    for mut joined_row in rows {
                        if let Some(value) = self.build_value(&joined.shape, &mut joined_row)? {
                            feature.push_property(name.clone(), value);
                        }
                    }
                }
                plan => {
                    if let Some(value) = self.build_value(plan, &mut row)? {
                        feature.push_property(name.clone(), value);
                    }
                }
            }
        }

        Ok(Arc::new(feature))
    }

    fn build_value(&self, plan: &ValuePlan, row: &mut Row) -> Result<Option<PropertyValue>> {
        Ok(match plan {
            ValuePlan::Primitive { index } => {
                let value = row.take(*index);
                if value.is_null() {
                    None
                } else {
                    Some(PropertyValue::Primitive(value))
                }
            }
            ValuePlan::Geometry { index, crs } => {
                let value = row.take(*index);
                if value.is_null() {
                    None
                } else {
                    let data = value.to_bytes()?;
                    let mut geometry = self.cx.geometry_codec.decode(&data)?;
                    // Stored geometries are expressed in the mapping's CRS
                    geometry.crs = crs.clone();
                    Some(PropertyValue::Geometry(geometry))
                }
            }
            ValuePlan::FeatureKey { index, target } => {
                let value = row.take(*index);
                if value.is_null() {
                    None
                } else {
                    let target_mapping = self.cx.schema.feature_type(target)?;
                    let id = target_mapping.fid.format_id(&value);
                    // Never followed eagerly; resolution goes through the
                    // schema's reference resolver on demand
                    Some(PropertyValue::Feature(FeatureRef::Unresolved(id)))
                }
            }
            ValuePlan::Complex { children } => {
                let mut properties = vec![];
                for (name, child) in children {
                    if let Some(value) = self.build_value(child, row)? {
                        properties.push(Property {
                            name: name.clone(),
                            value,
                        });
                    }
                }
                if properties.is_empty() {
                    None
                } else {
                    Some(PropertyValue::Complex(properties))
                }
            }
            ValuePlan::Joined { .. } => {
                return Err(loam_core::err!(
                    "joined plans cannot nest inside other joined plans"
                ))
            }
        })
    }
}
