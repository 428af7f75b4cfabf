//! JNI entry points for the Android app
//!
//! Kotlin side:
//!
//! ```kotlin
//! package com.example.cheez_admin_app
//!
//! object NativeBridge {
//!     init { System.loadLibrary("cheez_bridge") }
//!     external fun install(context: Context): Boolean
//!     external fun handleMethodCall(channel: String, callJson: String): String
//! }
//! ```
//!
//! `install` must run once (e.g. from `configureFlutterEngine`) before any call.

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::platform::android::AndroidHost;
use jni::objects::{JClass, JObject, JString};
use jni::sys::{jboolean, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::sync::Arc;

#[no_mangle]
pub extern "system" fn Java_com_example_cheez_1admin_1app_NativeBridge_install<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    context: JObject<'local>,
) -> jboolean {
    match AndroidHost::new(&mut env, &context) {
        Ok(host) => {
            crate::install(Bridge::new(Arc::new(host), BridgeConfig::default()));
            JNI_TRUE
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Android bridge");
            JNI_FALSE
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_example_cheez_1admin_1app_NativeBridge_handleMethodCall<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    channel: JString<'local>,
    call_json: JString<'local>,
) -> jstring {
    let response = match (read_string(&mut env, &channel), read_string(&mut env, &call_json)) {
        (Some(channel), Some(call_json)) => crate::handle_method_call(channel, call_json),
        _ => crate::channel::codec::encode_response(&crate::MethodResponse::invalid_argument(
            "Channel or method call is null",
        )),
    };

    match env.new_string(response) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to return method response to Java");
            std::ptr::null_mut()
        }
    }
}

fn read_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Option<String> {
    if value.is_null() {
        return None;
    }
    env.get_string(value).ok().map(Into::into)
}
