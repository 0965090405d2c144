//! Idempotent DDL bootstrap: the clinic tables are created on startup if
//! absent, in foreign-key dependency order.

use crate::error::AppError;
use sqlx::PgPool;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS localidades (
        id_localidad SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS barrios (
        id_barrio SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL,
        id_localidad INTEGER NOT NULL REFERENCES localidades (id_localidad)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clientes (
        id_cliente SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL,
        apellido TEXT NOT NULL,
        telefono TEXT NOT NULL,
        email TEXT NOT NULL,
        direccion TEXT NOT NULL,
        id_barrio INTEGER REFERENCES barrios (id_barrio)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS mascotas (
        id_mascota SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL,
        especie TEXT NOT NULL,
        raza TEXT NOT NULL,
        edad INTEGER NOT NULL,
        peso NUMERIC(10, 2) NOT NULL,
        id_cliente INTEGER NOT NULL REFERENCES clientes (id_cliente)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS usuarios (
        id_usuario SERIAL PRIMARY KEY,
        usuario TEXT NOT NULL UNIQUE,
        contrasena TEXT NOT NULL,
        nombre TEXT NOT NULL,
        apellido TEXT NOT NULL,
        email TEXT NOT NULL,
        telefono TEXT,
        rol TEXT NOT NULL CHECK (rol IN ('admin', 'veterinario', 'recepcionista'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS veterinarios (
        id_veterinario SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL,
        apellido TEXT NOT NULL,
        especialidad TEXT NOT NULL,
        telefono TEXT,
        email TEXT,
        id_usuario INTEGER REFERENCES usuarios (id_usuario)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS servicios (
        id_servicio SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL,
        descripcion TEXT,
        precio NUMERIC(10, 2) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enfermedades (
        id_enfermedad SERIAL PRIMARY KEY,
        nombre TEXT NOT NULL,
        descripcion TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enfermedades_mascotas (
        id_enfermedad_mascota SERIAL PRIMARY KEY,
        id_mascota INTEGER NOT NULL REFERENCES mascotas (id_mascota),
        id_enfermedad INTEGER NOT NULL REFERENCES enfermedades (id_enfermedad),
        fecha_diagnostico DATE NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS citas (
        id_cita SERIAL PRIMARY KEY,
        fecha DATE NOT NULL,
        hora TIME NOT NULL,
        id_mascota INTEGER NOT NULL REFERENCES mascotas (id_mascota),
        id_veterinario INTEGER NOT NULL REFERENCES veterinarios (id_veterinario),
        motivo TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tratamientos (
        id_tratamiento SERIAL PRIMARY KEY,
        descripcion TEXT NOT NULL,
        medicamento TEXT NOT NULL,
        dosis TEXT NOT NULL,
        id_cita INTEGER NOT NULL REFERENCES citas (id_cita)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS facturas (
        id_factura SERIAL PRIMARY KEY,
        fecha_emision DATE NOT NULL,
        total NUMERIC(10, 2) NOT NULL,
        metodo_pago TEXT NOT NULL,
        id_cliente INTEGER NOT NULL REFERENCES clientes (id_cliente)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS detalles_facturas (
        id_detalle_factura SERIAL PRIMARY KEY,
        id_factura INTEGER NOT NULL REFERENCES facturas (id_factura),
        id_servicio INTEGER NOT NULL REFERENCES servicios (id_servicio),
        cantidad INTEGER NOT NULL,
        subtotal NUMERIC(10, 2) NOT NULL
    )
    "#,
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    for ddl in DDL {
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}
