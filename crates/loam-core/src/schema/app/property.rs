/// Declaration of one property of a feature type.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
}

#[derive(Debug, Clone)]
pub enum PropertyKind {
    Primitive {
        /// Mapping-expression string; a column name is derived otherwise.
        expr: Option<String>,

        /// Primitive-type token.
        ty: String,

        join: Option<JoinDecl>,
    },
    Geometry {
        expr: Option<String>,

        /// Geometry-kind token, e.g. `point` or `surface`.
        kind: String,

        /// Coordinate dimensionality (2 or 3).
        dim: u8,

        /// Storage CRS identifier.
        crs: String,

        join: Option<JoinDecl>,
    },
    Feature {
        /// Name of the referenced feature type.
        target: String,

        /// Mapping expression for the foreign-key column on the feature's
        /// own table; required unless the relation goes through a join
        /// table.
        key: Option<String>,

        join: Option<JoinDecl>,
    },
    Compound {
        children: Vec<Property>,
        join: Option<JoinDecl>,
    },
}

/// Declaration of a join chain.
#[derive(Debug, Clone)]
pub struct JoinDecl {
    pub steps: Vec<JoinStepDecl>,

    /// Column of the final table that the engine generates a synthetic key
    /// for.
    pub generated_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JoinStepDecl {
    pub table: String,
    pub source_column: String,
    pub target_column: String,
}

impl Property {
    pub fn primitive(name: impl Into<String>, ty: impl Into<String>) -> Property {
        Property {
            name: name.into(),
            kind: PropertyKind::Primitive {
                expr: None,
                ty: ty.into(),
                join: None,
            },
        }
    }

    pub fn geometry(name: impl Into<String>, kind: impl Into<String>, crs: impl Into<String>) -> Property {
        Property {
            name: name.into(),
            kind: PropertyKind::Geometry {
                expr: None,
                kind: kind.into(),
                dim: 2,
                crs: crs.into(),
                join: None,
            },
        }
    }

    pub fn feature(name: impl Into<String>, target: impl Into<String>) -> Property {
        Property {
            name: name.into(),
            kind: PropertyKind::Feature {
                target: target.into(),
                key: None,
                join: None,
            },
        }
    }

    pub fn compound(name: impl Into<String>, children: Vec<Property>) -> Property {
        Property {
            name: name.into(),
            kind: PropertyKind::Compound {
                children,
                join: None,
            },
        }
    }

    /// Sets the mapping-expression string (or foreign-key expression for
    /// feature-reference properties).
    pub fn expr(mut self, value: impl Into<String>) -> Property {
        match &mut self.kind {
            PropertyKind::Primitive { expr, .. } => *expr = Some(value.into()),
            PropertyKind::Geometry { expr, .. } => *expr = Some(value.into()),
            PropertyKind::Feature { key, .. } => *key = Some(value.into()),
            PropertyKind::Compound { .. } => {}
        }
        self
    }

    pub fn join(mut self, decl: JoinDecl) -> Property {
        match &mut self.kind {
            PropertyKind::Primitive { join, .. }
            | PropertyKind::Geometry { join, .. }
            | PropertyKind::Feature { join, .. }
            | PropertyKind::Compound { join, .. } => *join = Some(decl),
        }
        self
    }
}

impl JoinDecl {
    pub fn step(
        table: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> JoinDecl {
        JoinDecl {
            steps: vec![JoinStepDecl {
                table: table.into(),
                source_column: source_column.into(),
                target_column: target_column.into(),
            }],
            generated_key: None,
        }
    }

    pub fn then(
        mut self,
        table: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> JoinDecl {
        self.steps.push(JoinStepDecl {
            table: table.into(),
            source_column: source_column.into(),
            target_column: target_column.into(),
        });
        self
    }

    pub fn generated_key(mut self, column: impl Into<String>) -> JoinDecl {
        self.generated_key = Some(column.into());
        self
    }
}
