//! Static entity catalog: one definition per clinic table, consumed by the
//! SQL builder, the validator and the handlers so no endpoint carries its own
//! field list.

/// Column type, used for SQL casts when binding JSON values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColType {
    Text,
    Int,
    Numeric,
    Date,
    Time,
}

impl ColType {
    /// PostgreSQL type name for `$n::type` casts.
    pub fn pg_name(self) -> &'static str {
        match self {
            ColType::Text => "text",
            ColType::Int => "int4",
            ColType::Numeric => "numeric",
            ColType::Date => "date",
            ColType::Time => "time",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColType,
    pub required: bool,
    /// Referenced table when this column is a foreign key.
    pub references: Option<&'static str>,
}

const fn col(name: &'static str, ty: ColType, required: bool) -> ColumnDef {
    ColumnDef {
        name,
        ty,
        required,
        references: None,
    }
}

const fn fk(name: &'static str, table: &'static str, required: bool) -> ColumnDef {
    ColumnDef {
        name,
        ty: ColType::Int,
        required,
        references: Some(table),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    Inner,
}

/// What the read query projects out of a joined table.
#[derive(Clone, Copy, Debug)]
pub enum JoinLabel {
    /// One column of the joined table, under an alias.
    Column {
        column: &'static str,
        alias: &'static str,
    },
    /// `nombre || ' ' || apellido` of the joined table, under an alias.
    FullName { alias: &'static str },
}

#[derive(Clone, Copy, Debug)]
pub struct JoinDef {
    pub kind: JoinKind,
    pub table: &'static str,
    pub table_alias: &'static str,
    /// Foreign-key column on this entity.
    pub on: &'static str,
    /// Key column on the joined table.
    pub on_joined: &'static str,
    pub label: JoinLabel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOrder {
    Unordered,
    /// `ORDER BY pk DESC`.
    NewestFirst,
}

/// Grammatical gender of the display name, for confirmation messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Genero {
    Masculino,
    Femenino,
}

#[derive(Clone, Copy, Debug)]
pub struct EntityDef {
    /// API path segment under `/api`.
    pub path: &'static str,
    pub table: &'static str,
    /// Display name used in confirmation and not-found messages.
    pub display: &'static str,
    pub genero: Genero,
    pub pk: &'static str,
    /// Insertable/updatable columns. The primary key is never listed here.
    pub columns: &'static [ColumnDef],
    /// Read-time joins resolving foreign keys to display labels.
    pub joins: &'static [JoinDef],
    pub order: ListOrder,
    /// Column stored as a one-way hash, stripped from every projection.
    pub secret: Option<&'static str>,
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.required)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.references.is_some())
    }

    pub fn is_secret(&self, name: &str) -> bool {
        self.secret == Some(name)
    }
}

pub const ENTITIES: &[EntityDef] = &[
    EntityDef {
        path: "localidades",
        table: "localidades",
        display: "Localidad",
        genero: Genero::Femenino,
        pk: "id_localidad",
        columns: &[col("nombre", ColType::Text, true)],
        joins: &[],
        order: ListOrder::Unordered,
        secret: None,
    },
    EntityDef {
        path: "barrios",
        table: "barrios",
        display: "Barrio",
        genero: Genero::Masculino,
        pk: "id_barrio",
        columns: &[
            col("nombre", ColType::Text, true),
            fk("id_localidad", "localidades", true),
        ],
        joins: &[JoinDef {
            kind: JoinKind::Left,
            table: "localidades",
            table_alias: "l",
            on: "id_localidad",
            on_joined: "id_localidad",
            label: JoinLabel::Column {
                column: "nombre",
                alias: "nombre_localidad",
            },
        }],
        order: ListOrder::NewestFirst,
        secret: None,
    },
    EntityDef {
        path: "clientes",
        table: "clientes",
        display: "Cliente",
        genero: Genero::Masculino,
        pk: "id_cliente",
        columns: &[
            col("nombre", ColType::Text, true),
            col("apellido", ColType::Text, true),
            col("telefono", ColType::Text, true),
            col("email", ColType::Text, true),
            col("direccion", ColType::Text, true),
            fk("id_barrio", "barrios", false),
        ],
        joins: &[JoinDef {
            kind: JoinKind::Left,
            table: "barrios",
            table_alias: "b",
            on: "id_barrio",
            on_joined: "id_barrio",
            label: JoinLabel::Column {
                column: "nombre",
                alias: "nombre_barrio",
            },
        }],
        order: ListOrder::NewestFirst,
        secret: None,
    },
    EntityDef {
        path: "mascotas",
        table: "mascotas",
        display: "Mascota",
        genero: Genero::Femenino,
        pk: "id_mascota",
        columns: &[
            col("nombre", ColType::Text, true),
            col("especie", ColType::Text, true),
            col("raza", ColType::Text, true),
            col("edad", ColType::Int, true),
            col("peso", ColType::Numeric, true),
            fk("id_cliente", "clientes", true),
        ],
        // A pet cannot exist without its owner, so the join is inner.
        joins: &[JoinDef {
            kind: JoinKind::Inner,
            table: "clientes",
            table_alias: "c",
            on: "id_cliente",
            on_joined: "id_cliente",
            label: JoinLabel::FullName {
                alias: "nombre_cliente",
            },
        }],
        order: ListOrder::NewestFirst,
        secret: None,
    },
    EntityDef {
        path: "usuarios",
        table: "usuarios",
        display: "Usuario",
        genero: Genero::Masculino,
        pk: "id_usuario",
        columns: &[
            col("usuario", ColType::Text, true),
            col("contrasena", ColType::Text, true),
            col("nombre", ColType::Text, true),
            col("apellido", ColType::Text, true),
            col("email", ColType::Text, true),
            col("telefono", ColType::Text, false),
            col("rol", ColType::Text, true),
        ],
        joins: &[],
        order: ListOrder::Unordered,
        secret: Some("contrasena"),
    },
    EntityDef {
        path: "veterinarios",
        table: "veterinarios",
        display: "Veterinario",
        genero: Genero::Masculino,
        pk: "id_veterinario",
        columns: &[
            col("nombre", ColType::Text, true),
            col("apellido", ColType::Text, true),
            col("especialidad", ColType::Text, true),
            col("telefono", ColType::Text, false),
            col("email", ColType::Text, false),
            fk("id_usuario", "usuarios", false),
        ],
        joins: &[JoinDef {
            kind: JoinKind::Left,
            table: "usuarios",
            table_alias: "u",
            on: "id_usuario",
            on_joined: "id_usuario",
            label: JoinLabel::Column {
                column: "usuario",
                alias: "nombre_usuario",
            },
        }],
        order: ListOrder::Unordered,
        secret: None,
    },
    EntityDef {
        path: "servicios",
        table: "servicios",
        display: "Servicio",
        genero: Genero::Masculino,
        pk: "id_servicio",
        columns: &[
            col("nombre", ColType::Text, true),
            col("descripcion", ColType::Text, false),
            col("precio", ColType::Numeric, true),
        ],
        joins: &[],
        order: ListOrder::Unordered,
        secret: None,
    },
    EntityDef {
        path: "enfermedades",
        table: "enfermedades",
        display: "Enfermedad",
        genero: Genero::Femenino,
        pk: "id_enfermedad",
        columns: &[
            col("nombre", ColType::Text, true),
            col("descripcion", ColType::Text, false),
        ],
        joins: &[],
        order: ListOrder::Unordered,
        secret: None,
    },
    EntityDef {
        path: "enfermedades_mascotas",
        table: "enfermedades_mascotas",
        display: "Registro de enfermedad",
        genero: Genero::Masculino,
        pk: "id_enfermedad_mascota",
        columns: &[
            fk("id_mascota", "mascotas", true),
            fk("id_enfermedad", "enfermedades", true),
            col("fecha_diagnostico", ColType::Date, true),
        ],
        joins: &[
            JoinDef {
                kind: JoinKind::Left,
                table: "mascotas",
                table_alias: "m",
                on: "id_mascota",
                on_joined: "id_mascota",
                label: JoinLabel::Column {
                    column: "nombre",
                    alias: "nombre_mascota",
                },
            },
            JoinDef {
                kind: JoinKind::Left,
                table: "enfermedades",
                table_alias: "e",
                on: "id_enfermedad",
                on_joined: "id_enfermedad",
                label: JoinLabel::Column {
                    column: "nombre",
                    alias: "nombre_enfermedad",
                },
            },
        ],
        order: ListOrder::Unordered,
        secret: None,
    },
    EntityDef {
        path: "citas",
        table: "citas",
        display: "Cita",
        genero: Genero::Femenino,
        pk: "id_cita",
        columns: &[
            col("fecha", ColType::Date, true),
            col("hora", ColType::Time, true),
            fk("id_mascota", "mascotas", true),
            fk("id_veterinario", "veterinarios", true),
            col("motivo", ColType::Text, true),
        ],
        joins: &[
            JoinDef {
                kind: JoinKind::Left,
                table: "mascotas",
                table_alias: "m",
                on: "id_mascota",
                on_joined: "id_mascota",
                label: JoinLabel::Column {
                    column: "nombre",
                    alias: "nombre_mascota",
                },
            },
            JoinDef {
                kind: JoinKind::Left,
                table: "veterinarios",
                table_alias: "v",
                on: "id_veterinario",
                on_joined: "id_veterinario",
                label: JoinLabel::FullName {
                    alias: "nombre_veterinario",
                },
            },
        ],
        order: ListOrder::NewestFirst,
        secret: None,
    },
    EntityDef {
        path: "tratamientos",
        table: "tratamientos",
        display: "Tratamiento",
        genero: Genero::Masculino,
        pk: "id_tratamiento",
        columns: &[
            col("descripcion", ColType::Text, true),
            col("medicamento", ColType::Text, true),
            col("dosis", ColType::Text, true),
            fk("id_cita", "citas", true),
        ],
        joins: &[JoinDef {
            kind: JoinKind::Left,
            table: "citas",
            table_alias: "ci",
            on: "id_cita",
            on_joined: "id_cita",
            label: JoinLabel::Column {
                column: "fecha",
                alias: "fecha_cita",
            },
        }],
        order: ListOrder::Unordered,
        secret: None,
    },
    EntityDef {
        path: "facturas",
        table: "facturas",
        display: "Factura",
        genero: Genero::Femenino,
        pk: "id_factura",
        columns: &[
            col("fecha_emision", ColType::Date, true),
            col("total", ColType::Numeric, true),
            col("metodo_pago", ColType::Text, true),
            fk("id_cliente", "clientes", true),
        ],
        joins: &[JoinDef {
            kind: JoinKind::Left,
            table: "clientes",
            table_alias: "c",
            on: "id_cliente",
            on_joined: "id_cliente",
            label: JoinLabel::FullName {
                alias: "nombre_cliente",
            },
        }],
        order: ListOrder::NewestFirst,
        secret: None,
    },
    EntityDef {
        path: "detalles_facturas",
        table: "detalles_facturas",
        display: "Detalle de factura",
        genero: Genero::Masculino,
        pk: "id_detalle_factura",
        columns: &[
            fk("id_factura", "facturas", true),
            fk("id_servicio", "servicios", true),
            col("cantidad", ColType::Int, true),
            col("subtotal", ColType::Numeric, true),
        ],
        joins: &[JoinDef {
            kind: JoinKind::Left,
            table: "servicios",
            table_alias: "s",
            on: "id_servicio",
            on_joined: "id_servicio",
            label: JoinLabel::Column {
                column: "nombre",
                alias: "nombre_servicio",
            },
        }],
        order: ListOrder::Unordered,
        secret: None,
    },
];

/// Resolve an API path segment. `facturacion` is kept as a legacy alias of
/// `facturas`.
pub fn entity_by_path(path: &str) -> Option<&'static EntityDef> {
    let path = if path == "facturacion" { "facturas" } else { path };
    ENTITIES.iter().find(|e| e.path == path)
}

pub fn entity_by_table(table: &str) -> Option<&'static EntityDef> {
    ENTITIES.iter().find(|e| e.table == table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_path_resolves() {
        for e in ENTITIES {
            assert!(entity_by_path(e.path).is_some(), "{}", e.path);
        }
    }

    #[test]
    fn facturacion_is_an_alias() {
        let e = entity_by_path("facturacion").unwrap();
        assert_eq!(e.table, "facturas");
    }

    #[test]
    fn unknown_path_does_not_resolve() {
        assert!(entity_by_path("dinosaurios").is_none());
    }

    #[test]
    fn foreign_keys_reference_known_tables() {
        for e in ENTITIES {
            for c in e.foreign_keys() {
                let target = c.references.unwrap();
                assert!(
                    entity_by_table(target).is_some(),
                    "{}.{} references unknown table {}",
                    e.table,
                    c.name,
                    target
                );
            }
        }
    }

    #[test]
    fn foreign_keys_are_integers() {
        for e in ENTITIES {
            for c in e.foreign_keys() {
                assert_eq!(c.ty, ColType::Int, "{}.{}", e.table, c.name);
            }
        }
    }

    #[test]
    fn joins_use_declared_columns() {
        for e in ENTITIES {
            for j in e.joins {
                assert!(e.column(j.on).is_some(), "{} join on {}", e.table, j.on);
                let joined = entity_by_table(j.table).unwrap();
                assert!(
                    joined.pk == j.on_joined || joined.column(j.on_joined).is_some(),
                    "{} joined column {}.{}",
                    e.table,
                    j.table,
                    j.on_joined
                );
            }
        }
    }

    #[test]
    fn pk_is_never_a_body_column() {
        for e in ENTITIES {
            assert!(e.column(e.pk).is_none(), "{}", e.table);
        }
    }

    #[test]
    fn secret_column_is_declared() {
        for e in ENTITIES {
            if let Some(s) = e.secret {
                assert!(e.column(s).is_some(), "{}", e.table);
            }
        }
    }

    #[test]
    fn usuarios_hides_contrasena() {
        let e = entity_by_path("usuarios").unwrap();
        assert!(e.is_secret("contrasena"));
    }
}
