// tests/generate_integration.rs

//! Resolution against a store, and build file generation.

mod common;

use common::{kitchen_for, register, setup_store};
use magnum_kitchen::cmake::cmake_path;
use magnum_kitchen::recipe;
use magnum_kitchen::settings::{Arch, BuildType, CompilerFamily, Os, Settings};
use magnum_kitchen::{Error, Profile};
use std::fs;

fn linux() -> Profile {
    Profile::with_settings(Settings::new(
        Os::Linux,
        Arch::X86_64,
        CompilerFamily::Gcc,
        BuildType::Release,
    ))
}

#[test]
fn test_prepare_orders_dependencies() {
    let (dir, store) = setup_store();
    let kitchen = kitchen_for(dir.path(), &store);
    let recipe = recipe::builtin().unwrap();

    let prepared = kitchen.prepare(&recipe, &linux()).unwrap();
    let order = prepared.deps.order();

    assert_eq!(prepared.deps.len(), 4);
    let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(pos("corrade") < pos("magnum"));

    let corrade = prepared.deps.get("corrade").unwrap();
    assert!(!corrade.direct);
    assert!(prepared.deps.get("eigen").unwrap().transitive_headers);
}

#[test]
fn test_generate_default_configuration() {
    let (dir, store) = setup_store();
    let kitchen = kitchen_for(dir.path(), &store);
    let recipe = recipe::builtin().unwrap();
    let out = dir.path().join("generators");

    let written = kitchen.generate(&recipe, &linux(), &out).unwrap();
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["toolchain.cmake", "FindEigen3.cmake", "FindGLM.cmake"]);

    let toolchain = fs::read_to_string(out.join("toolchain.cmake")).unwrap();
    let prepared = kitchen.prepare(&recipe, &linux()).unwrap();
    let magnum = cmake_path(prepared.deps.package_folder("magnum").unwrap());
    let corrade = cmake_path(prepared.deps.package_folder("corrade").unwrap());

    assert!(toolchain.contains(&format!("set(Magnum_ROOT \"{}\" CACHE STRING \"\" FORCE)", magnum)));
    assert!(toolchain.contains(&format!("set(Corrade_ROOT \"{}\" CACHE STRING \"\" FORCE)", corrade)));
    assert!(toolchain.contains("set(BUILD_STATIC \"ON\" CACHE BOOL \"\" FORCE)"));
    assert!(toolchain.contains("set(BUILD_STATIC_PIC \"ON\" CACHE BOOL \"\" FORCE)"));
    assert!(toolchain.contains("set(WITH_BULLET \"OFF\" CACHE BOOL \"\" FORCE)"));
    assert!(toolchain.contains("set(LIB_SUFFIX \"\" CACHE STRING \"\" FORCE)"));

    let glm = fs::read_to_string(out.join("FindGLM.cmake")).unwrap();
    assert!(glm.contains("GLM::GLM"));
    let eigen = fs::read_to_string(out.join("FindEigen3.cmake")).unwrap();
    assert!(eigen.contains("Eigen3::Eigen"));
}

#[test]
fn test_generation_is_deterministic() {
    let (dir, store) = setup_store();
    let kitchen = kitchen_for(dir.path(), &store);
    let recipe = recipe::builtin().unwrap();

    let first = dir.path().join("a");
    let second = dir.path().join("b");
    kitchen.generate(&recipe, &linux(), &first).unwrap();
    kitchen.generate(&recipe, &linux(), &second).unwrap();

    for name in ["toolchain.cmake", "FindEigen3.cmake", "FindGLM.cmake"] {
        let a = fs::read_to_string(first.join(name)).unwrap();
        let b = fs::read_to_string(second.join(name)).unwrap();
        // The toolchain names its own folder, everything else is identical
        assert_eq!(
            a.replace(&cmake_path(&first), ""),
            b.replace(&cmake_path(&second), "")
        );
    }
}

#[test]
fn test_shared_needs_shared_magnum() {
    let (dir, store) = setup_store();
    let kitchen = kitchen_for(dir.path(), &store);
    let recipe = recipe::builtin().unwrap();

    let mut profile = linux();
    profile.apply_option("shared=True").unwrap();

    let err = kitchen.prepare(&recipe, &profile).unwrap_err();
    match err {
        Error::NotFound(msg) => assert!(msg.contains("shared=True"), "{}", msg),
        other => panic!("unexpected error: {}", other),
    }

    let shared = register(
        &store,
        dir.path(),
        "magnum/2020.06@camposs/stable",
        &["corrade/2020.06"],
        &[("shared", true)],
        &["Magnum"],
    );
    let prepared = kitchen.prepare(&recipe, &profile).unwrap();
    assert_eq!(
        prepared.deps.get("magnum").unwrap().manifest.package_id,
        shared.package_id
    );
}

#[test]
fn test_optional_requirements_follow_options() {
    let (dir, store) = setup_store();
    let kitchen = kitchen_for(dir.path(), &store);
    let recipe = recipe::builtin().unwrap();

    let mut profile = linux();
    profile.apply_option("with_eigen=False").unwrap();
    profile.apply_option("with_glm=False").unwrap();

    let out = dir.path().join("generators");
    let written = kitchen.generate(&recipe, &profile, &out).unwrap();
    assert_eq!(written.len(), 1);

    // Bullet is not in the store
    profile.apply_option("with_bullet=True").unwrap();
    let err = kitchen.prepare(&recipe, &profile).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_windows_has_no_fpic() {
    let (dir, store) = setup_store();
    let kitchen = kitchen_for(dir.path(), &store);
    let recipe = recipe::builtin().unwrap();

    let mut profile = Profile::with_settings(Settings::new(
        Os::Windows,
        Arch::X86_64,
        CompilerFamily::Msvc,
        BuildType::Release,
    ));
    let out = dir.path().join("generators");
    kitchen.generate(&recipe, &profile, &out).unwrap();
    let toolchain = fs::read_to_string(out.join("toolchain.cmake")).unwrap();
    assert!(!toolchain.contains("FPIC"));
    assert!(!toolchain.contains("CMAKE_POSITION_INDEPENDENT_CODE"));
    assert!(toolchain.contains("set(BUILD_STATIC_PIC \"OFF\" CACHE BOOL \"\" FORCE)"));

    profile.apply_option("fPIC=True").unwrap();
    let err = kitchen.prepare(&recipe, &profile).unwrap_err();
    assert!(matches!(err, Error::OptionNotAvailable { .. }));
}
