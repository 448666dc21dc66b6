fn main() {
    println!("cargo:rerun-if-env-changed=WIFI_SSID");
    println!("cargo:rerun-if-env-changed=WIFI_PASS");

    // Host builds (`--no-default-features`) have no ESP-IDF sysenv to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
