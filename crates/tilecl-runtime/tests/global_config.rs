use tilecl_runtime::{config::GlobalConfig, Architecture, Plane};

// Runs in its own test binary: the global configuration can only be set once per process.
#[test_log::test]
fn set_configuration_is_used_by_planes() {
    let mut config = GlobalConfig::default();
    config.device.arch = Architecture::Hopper;
    config.device.scratch_size = Some(8192);
    GlobalConfig::set(config);

    let plane = Plane::from_config();

    assert_eq!(plane.properties().arch, Architecture::Hopper);
    assert_eq!(plane.properties().scratch_size, 8192);
    assert_eq!(GlobalConfig::get().device.scratch_size, Some(8192));

    let result = std::panic::catch_unwind(|| GlobalConfig::set(GlobalConfig::default()));
    assert!(result.is_err());
}
