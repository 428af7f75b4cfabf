//! Android host via JNI
//!
//! Every capability is a short sequence of JNI calls against the Activity the app
//! installed the bridge with:
//!
//! - shareable URIs: `FileProvider.getUriForFile(context, authority, file)`
//! - activities: `context.startActivity(intent)`
//! - broadcasts: `context.sendBroadcast(intent)`
//! - media records: `ContentResolver.insert(MediaStore.Images.Media.EXTERNAL_CONTENT_URI, values)`
//!   and `ContentResolver.openOutputStream(uri)`
//!
//! A Java exception thrown by any call is cleared and reported as
//! [`BridgeError::Platform`] naming the failing call.

#![cfg(target_os = "android")]

use super::{HostPlatform, Intent, IntentExtra, MediaCapability, MediaHandle, MediaRecord};
use crate::error::{BridgeError, Result};
use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// MediaStore.MediaColumns
const COLUMN_DISPLAY_NAME: &str = "_display_name";
const COLUMN_MIME_TYPE: &str = "mime_type";
const COLUMN_RELATIVE_PATH: &str = "relative_path";

const SIG_INTENT_STRING: &str = "(Ljava/lang/String;)Landroid/content/Intent;";

/// Clear a pending Java exception and convert the error
trait JniResultExt<T> {
    fn or_bridge(self, env: &mut JNIEnv<'_>, context: &str) -> Result<T>;
}

impl<T> JniResultExt<T> for jni::errors::Result<T> {
    fn or_bridge(self, env: &mut JNIEnv<'_>, context: &str) -> Result<T> {
        self.map_err(|e| {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_describe();
                let _ = env.exception_clear();
            }
            BridgeError::platform(context, e)
        })
    }
}

pub struct AndroidHost {
    vm: JavaVM,
    context: GlobalRef,
    capability: MediaCapability,
}

impl AndroidHost {
    /// Wrap the hosting Activity (or application Context) and read `Build.VERSION.SDK_INT`
    pub fn new(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<Self> {
        let vm = env.get_java_vm().or_bridge(env, "get_java_vm")?;
        let context = env.new_global_ref(context).or_bridge(env, "new_global_ref(context)")?;

        let api_level = env
            .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
            .or_bridge(env, "Build.VERSION.SDK_INT")?
            .i()
            .or_bridge(env, "SDK_INT->i")?;

        tracing::info!(api_level, "Android host created");
        Ok(Self {
            vm,
            context,
            capability: MediaCapability::from_api_level(api_level),
        })
    }

    fn with_env<T>(&self, f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
        let mut guard = self
            .vm
            .attach_current_thread()
            .map_err(|e| BridgeError::platform("attach_current_thread", e))?;
        f(&mut guard, self.context.as_obj())
    }
}

impl HostPlatform for AndroidHost {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn media_capability(&self) -> MediaCapability {
        self.capability
    }

    fn app_package(&self) -> Result<String> {
        self.with_env(|env, context| package_name(env, context))
    }

    fn resolve_shareable_uri(&self, path: &Path, authority: &str) -> Result<String> {
        self.with_env(|env, context| {
            let j_authority = env
                .new_string(authority)
                .or_bridge(env, "new_string(authority)")?;
            let file = java_file(env, path)?;

            let uri = env
                .call_static_method(
                    "androidx/core/content/FileProvider",
                    "getUriForFile",
                    "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
                    &[
                        JValue::Object(context),
                        JValue::Object(&j_authority),
                        JValue::Object(&file),
                    ],
                )
                .or_bridge(env, "FileProvider.getUriForFile")?
                .l()
                .or_bridge(env, "getUriForFile->l")?;

            uri_to_string(env, &uri)
        })
    }

    fn dispatch_intent(&self, intent: &Intent) -> Result<()> {
        self.with_env(|env, context| {
            let j_intent = java_intent(env, intent)?;
            env.call_method(
                context,
                "startActivity",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&j_intent)],
            )
            .or_bridge(env, "startActivity")?;

            tracing::info!(action = %intent.action, package = intent.package_or_any(), "Android: activity started");
            Ok(())
        })
    }

    fn send_broadcast(&self, intent: &Intent) -> Result<()> {
        self.with_env(|env, context| {
            let j_intent = java_intent(env, intent)?;
            env.call_method(
                context,
                "sendBroadcast",
                "(Landroid/content/Intent;)V",
                &[JValue::Object(&j_intent)],
            )
            .or_bridge(env, "sendBroadcast")?;

            tracing::info!(action = %intent.action, "Android: broadcast sent");
            Ok(())
        })
    }

    fn insert_media_record(&self, record: &MediaRecord) -> Result<Option<MediaHandle>> {
        self.with_env(|env, context| {
            let values = env
                .new_object("android/content/ContentValues", "()V", &[])
                .or_bridge(env, "new ContentValues")?;
            for (column, value) in [
                (COLUMN_DISPLAY_NAME, &record.display_name),
                (COLUMN_MIME_TYPE, &record.mime_type),
                (COLUMN_RELATIVE_PATH, &record.relative_path),
            ] {
                let j_column = env.new_string(column).or_bridge(env, "new_string(column)")?;
                let j_value = env.new_string(value).or_bridge(env, "new_string(value)")?;
                env.call_method(
                    &values,
                    "put",
                    "(Ljava/lang/String;Ljava/lang/String;)V",
                    &[JValue::Object(&j_column), JValue::Object(&j_value)],
                )
                .or_bridge(env, "ContentValues.put")?;
            }

            let collection = env
                .get_static_field(
                    "android/provider/MediaStore$Images$Media",
                    "EXTERNAL_CONTENT_URI",
                    "Landroid/net/Uri;",
                )
                .or_bridge(env, "MediaStore.Images.Media.EXTERNAL_CONTENT_URI")?
                .l()
                .or_bridge(env, "EXTERNAL_CONTENT_URI->l")?;

            let resolver = content_resolver(env, context)?;
            let uri = env
                .call_method(
                    &resolver,
                    "insert",
                    "(Landroid/net/Uri;Landroid/content/ContentValues;)Landroid/net/Uri;",
                    &[JValue::Object(&collection), JValue::Object(&values)],
                )
                .or_bridge(env, "ContentResolver.insert")?
                .l()
                .or_bridge(env, "insert->l")?;

            if uri.is_null() {
                tracing::warn!(display_name = %record.display_name, "Android: media index refused insert");
                return Ok(None);
            }

            let uri = uri_to_string(env, &uri)?;
            tracing::info!(%uri, display_name = %record.display_name, "Android: media record inserted");
            Ok(Some(MediaHandle { uri }))
        })
    }

    fn open_output_stream(&self, handle: &MediaHandle) -> Result<Option<Box<dyn Write + '_>>> {
        let stream = self.with_env(|env, context| {
            let uri = parse_uri(env, &handle.uri)?;
            let resolver = content_resolver(env, context)?;
            let stream = env
                .call_method(
                    &resolver,
                    "openOutputStream",
                    "(Landroid/net/Uri;)Ljava/io/OutputStream;",
                    &[JValue::Object(&uri)],
                )
                .or_bridge(env, "ContentResolver.openOutputStream")?
                .l()
                .or_bridge(env, "openOutputStream->l")?;

            if stream.is_null() {
                return Ok(None);
            }
            let global = env
                .new_global_ref(&stream)
                .or_bridge(env, "new_global_ref(stream)")?;
            Ok(Some(global))
        })?;

        Ok(stream.map(|stream| {
            Box::new(JavaOutputStream {
                vm: &self.vm,
                stream,
            }) as Box<dyn Write + '_>
        }))
    }

    fn public_pictures_dir(&self) -> Result<PathBuf> {
        self.with_env(|env, _context| {
            let dir_type = env
                .get_static_field(
                    "android/os/Environment",
                    "DIRECTORY_PICTURES",
                    "Ljava/lang/String;",
                )
                .or_bridge(env, "Environment.DIRECTORY_PICTURES")?
                .l()
                .or_bridge(env, "DIRECTORY_PICTURES->l")?;

            let dir = env
                .call_static_method(
                    "android/os/Environment",
                    "getExternalStoragePublicDirectory",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&dir_type)],
                )
                .or_bridge(env, "Environment.getExternalStoragePublicDirectory")?
                .l()
                .or_bridge(env, "getExternalStoragePublicDirectory->l")?;

            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])
                .or_bridge(env, "File.getAbsolutePath")?
                .l()
                .or_bridge(env, "getAbsolutePath->l")?;

            Ok(PathBuf::from(java_string(env, path)?))
        })
    }
}

/// `java.io.OutputStream` from the content resolver; closed on drop
struct JavaOutputStream<'vm> {
    vm: &'vm JavaVM,
    stream: GlobalRef,
}

impl JavaOutputStream<'_> {
    fn call(&self, name: &str, sig: &str, bytes: Option<&[u8]>) -> io::Result<()> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

        let result = match bytes {
            Some(bytes) => {
                let array = env
                    .byte_array_from_slice(bytes)
                    .or_bridge(&mut env, "byte_array_from_slice")
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
                let result = env
                    .call_method(self.stream.as_obj(), name, sig, &[JValue::Object(&array)])
                    .or_bridge(&mut env, name);
                let _ = env.delete_local_ref(array);
                result
            }
            None => env
                .call_method(self.stream.as_obj(), name, sig, &[])
                .or_bridge(&mut env, name),
        };

        result
            .map(|_| ())
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}

impl Write for JavaOutputStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.call("write", "([B)V", Some(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.call("flush", "()V", None)
    }
}

impl Drop for JavaOutputStream<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.call("close", "()V", None) {
            tracing::warn!(error = %e, "Android: failed to close output stream");
        }
    }
}

fn java_string(env: &mut JNIEnv<'_>, obj: JObject<'_>) -> Result<String> {
    let j_string = JString::from(obj);
    let value: String = env
        .get_string(&j_string)
        .or_bridge(env, "get_string")?
        .into();
    Ok(value)
}

fn package_name(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<String> {
    let package = env
        .call_method(context, "getPackageName", "()Ljava/lang/String;", &[])
        .or_bridge(env, "getPackageName")?
        .l()
        .or_bridge(env, "getPackageName->l")?;
    java_string(env, package)
}

fn content_resolver<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Result<JObject<'local>> {
    env.call_method(
        context,
        "getContentResolver",
        "()Landroid/content/ContentResolver;",
        &[],
    )
    .or_bridge(env, "getContentResolver")?
    .l()
    .or_bridge(env, "getContentResolver->l")
}

fn java_file<'local>(env: &mut JNIEnv<'local>, path: &Path) -> Result<JObject<'local>> {
    let j_path = env
        .new_string(path.to_string_lossy())
        .or_bridge(env, "new_string(path)")?;
    env.new_object("java/io/File", "(Ljava/lang/String;)V", &[JValue::Object(&j_path)])
        .or_bridge(env, "new File(path)")
}

fn parse_uri<'local>(env: &mut JNIEnv<'local>, uri: &str) -> Result<JObject<'local>> {
    let j_uri = env.new_string(uri).or_bridge(env, "new_string(uri)")?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&j_uri)],
    )
    .or_bridge(env, "Uri.parse")?
    .l()
    .or_bridge(env, "Uri.parse->l")
}

fn uri_to_string(env: &mut JNIEnv<'_>, uri: &JObject<'_>) -> Result<String> {
    let text = env
        .call_method(uri, "toString", "()Ljava/lang/String;", &[])
        .or_bridge(env, "Uri.toString")?
        .l()
        .or_bridge(env, "Uri.toString->l")?;
    java_string(env, text)
}

/// Build an `android.content.Intent` from its description
fn java_intent<'local>(env: &mut JNIEnv<'local>, intent: &Intent) -> Result<JObject<'local>> {
    let j_action = env
        .new_string(&intent.action)
        .or_bridge(env, "new_string(action)")?;
    let j_intent = env
        .new_object(
            "android/content/Intent",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_action)],
        )
        .or_bridge(env, "new Intent")?;

    // setType() clears data and setData() clears type, so both go through setDataAndType()
    match (&intent.data, &intent.mime_type) {
        (Some(data), Some(mime)) => {
            let uri = parse_uri(env, data)?;
            let j_mime = env.new_string(mime).or_bridge(env, "new_string(mime)")?;
            env.call_method(
                &j_intent,
                "setDataAndType",
                "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&uri), JValue::Object(&j_mime)],
            )
            .or_bridge(env, "Intent.setDataAndType")?;
        }
        (Some(data), None) => {
            let uri = parse_uri(env, data)?;
            env.call_method(
                &j_intent,
                "setData",
                "(Landroid/net/Uri;)Landroid/content/Intent;",
                &[JValue::Object(&uri)],
            )
            .or_bridge(env, "Intent.setData")?;
        }
        (None, Some(mime)) => {
            let j_mime = env.new_string(mime).or_bridge(env, "new_string(mime)")?;
            env.call_method(&j_intent, "setType", SIG_INTENT_STRING, &[JValue::Object(&j_mime)])
                .or_bridge(env, "Intent.setType")?;
        }
        (None, None) => {}
    }

    if let Some(package) = &intent.package {
        let j_package = env
            .new_string(package)
            .or_bridge(env, "new_string(package)")?;
        env.call_method(&j_intent, "setPackage", SIG_INTENT_STRING, &[JValue::Object(&j_package)])
            .or_bridge(env, "Intent.setPackage")?;
    }

    for (key, extra) in &intent.extras {
        let j_key = env.new_string(key).or_bridge(env, "new_string(extra key)")?;
        match extra {
            IntentExtra::Text(text) => {
                let j_text = env.new_string(text).or_bridge(env, "new_string(extra text)")?;
                env.call_method(
                    &j_intent,
                    "putExtra",
                    "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
                    &[JValue::Object(&j_key), JValue::Object(&j_text)],
                )
                .or_bridge(env, "Intent.putExtra(String)")?;
            }
            IntentExtra::Stream(uri) => {
                let j_uri = parse_uri(env, uri)?;
                env.call_method(
                    &j_intent,
                    "putExtra",
                    "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;",
                    &[JValue::Object(&j_key), JValue::Object(&j_uri)],
                )
                .or_bridge(env, "Intent.putExtra(Parcelable)")?;
            }
        }
    }

    if intent.flags != 0 {
        env.call_method(
            &j_intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(intent.flags)],
        )
        .or_bridge(env, "Intent.addFlags")?;
    }

    Ok(j_intent)
}
