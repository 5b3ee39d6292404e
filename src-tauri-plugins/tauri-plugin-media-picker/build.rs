const COMMANDS: &[&str] = &["authorize", "present"];

fn main() {
  tauri_plugin::Builder::new(COMMANDS)
    .android_path("android")
    .build();
}
