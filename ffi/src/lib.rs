use build_engine::validate::validate_wire;
use build_engine::{Engine, WireBuild};
use jni::objects::{JClass, JString};
use jni::sys::{jlong, jstring};
use jni::JNIEnv;
use serde_json::{json, Value};
use std::sync::OnceLock;

static ENGINE: OnceLock<Result<Engine, String>> = OnceLock::new();

/// The builtin engine, parsed on first use and shared by every call.
fn engine() -> Result<&'static Engine, String> {
    ENGINE
        .get_or_init(|| Engine::builtin().map_err(|e| format!("engine_unavailable: {:#}", e)))
        .as_ref()
        .map_err(Clone::clone)
}

fn parse_build(input: &str) -> Result<WireBuild, String> {
    serde_json::from_str(input).map_err(|e| format!("invalid_build: {}", e))
}

fn to_value(value: impl serde::Serialize) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Compact and JSON share tokens for a build given as JSON.
pub fn encode_json_build(input: &str) -> Result<Value, String> {
    let engine = engine()?;
    let build = parse_build(input)?.into_build(engine.catalog());
    Ok(json!({
        "token": engine.encode(&build),
        "jsonToken": engine.encode_json(&build),
    }))
}

/// The build behind a token or share URL, plus the layout it was written in.
pub fn decode_token(token: &str) -> Result<Value, String> {
    let engine = engine()?;
    let decoded = engine.decode_raw(token).map_err(|e| format!("invalid_token: {}", e))?;
    let format = decoded.format.to_string();
    let build = decoded.wire.into_build(engine.catalog());
    Ok(json!({
        "format": format,
        "build": to_value(WireBuild::from_build(&build))?,
    }))
}

pub fn stats_json(input: &str) -> Result<Value, String> {
    let engine = engine()?;
    let build = parse_build(input)?.into_build(engine.catalog());
    to_value(engine.compute_stats(&build))
}

/// Validation runs on the build exactly as given, so unknown entries and
/// mismatched rank arrays are reported rather than dropped.
pub fn validate_json(input: &str) -> Result<Value, String> {
    let engine = engine()?;
    let wire = parse_build(input)?;
    to_value(validate_wire(&wire, engine.catalog(), engine.rules()))
}

pub fn sample_json(seed: u64) -> Result<Value, String> {
    let engine = engine()?;
    let build = engine.sample(seed);
    Ok(json!({
        "token": engine.encode(&build),
        "build": to_value(WireBuild::from_build(&build))?,
    }))
}

fn envelope(result: Result<Value, String>) -> String {
    match result {
        Ok(value) => json!({ "ok": true, "result": value }).to_string(),
        Err(error) => json!({ "ok": false, "error": error }).to_string(),
    }
}

fn respond(env: &JNIEnv, result: Result<Value, String>) -> jstring {
    match env.new_string(envelope(result)) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn with_input(
    env: &mut JNIEnv,
    input: &JString,
    op: impl FnOnce(&str) -> Result<Value, String>,
) -> jstring {
    let result = match env.get_string(input) {
        Ok(s) => op(&String::from(s)),
        Err(e) => Err(format!("invalid_input: {}", e)),
    };
    respond(env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_terrarp_build_Ffi_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    match env.new_string(concat!("build-ffi ", env!("CARGO_PKG_VERSION"))) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_terrarp_build_Ffi_encodeBuildJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(&mut env, &json, encode_json_build)
}

#[no_mangle]
pub extern "system" fn Java_com_terrarp_build_Ffi_decodeToken(
    mut env: JNIEnv,
    _class: JClass,
    token: JString,
) -> jstring {
    with_input(&mut env, &token, decode_token)
}

#[no_mangle]
pub extern "system" fn Java_com_terrarp_build_Ffi_statsJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(&mut env, &json, stats_json)
}

#[no_mangle]
pub extern "system" fn Java_com_terrarp_build_Ffi_validateJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    with_input(&mut env, &json, validate_json)
}

#[no_mangle]
pub extern "system" fn Java_com_terrarp_build_Ffi_sampleJson(
    env: JNIEnv,
    _class: JClass,
    seed: jlong,
) -> jstring {
    respond(&env, sample_json(seed as u64))
}
