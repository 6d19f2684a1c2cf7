//! DLL → component mapping table.
//!
//! Each DLL maps to exactly one installable component (a winetricks verb or
//! a Bottles-managed translation layer). Lookups are case-insensitive and a
//! DLL missing from the table is ignored by every consumer.

/// Immutable mapping from lower-cased DLL (or font) file name to component.
pub const COMPONENT_TABLE: &[(&str, &str)] = &[
    // DirectX / graphics
    ("d3d9.dll", "d3dx9"),
    ("d3d10.dll", "d3dx10"),
    ("d3d11.dll", "dxvk"),
    ("d3d11_1.dll", "dxvk"),
    ("d3d11_2.dll", "dxvk"),
    ("d3d11_3.dll", "dxvk"),
    ("d3d11_4.dll", "dxvk"),
    ("d3d12.dll", "vkd3d"),
    ("d3dcompiler_43.dll", "d3dcompiler_43"),
    ("d3dcompiler_47.dll", "d3dcompiler_47"),
    ("dxgi.dll", "dxvk"),
    // Input & audio
    ("xinput1_3.dll", "xinput"),
    ("xinput1_4.dll", "xinput"),
    ("dinput8.dll", "dinput"),
    ("openal32.dll", "openal"),
    ("fmod.dll", "fmod"),
    ("fmodex.dll", "fmod"),
    // Video codecs
    ("binkw32.dll", "bink"),
    ("binkw64.dll", "bink"),
    ("bink2w32.dll", "bink2"),
    ("bink2w64.dll", "bink2"),
    // Physics
    ("physxloader.dll", "physx"),
    ("physx3_x86.dll", "physx"),
    ("physx3_x64.dll", "physx"),
    // GPU / VR
    ("openvr_api.dll", "openvr"),
    ("nvapi.dll", "dxvk-nvapi"),
    // Store loaders
    ("ubiorbitapi_r2.dll", "ubisoftconnect"),
    ("uplay_r1.dll", "ubisoftconnect"),
    ("uplay_r1_loader.dll", "ubisoftconnect"),
    // .NET
    ("mscoree.dll", "dotnet40"),
    ("clr.dll", "dotnet40"),
    ("system.dll", "dotnet40"),
    // Visual C++ runtimes
    ("msvcp140.dll", "vcrun2019"),
    ("vcruntime140.dll", "vcrun2019"),
    ("msvcp140_1.dll", "vcrun2019"),
    ("msvcp140_2.dll", "vcrun2019"),
    ("vcomp140.dll", "vcrun2019"),
    ("vcruntime140_1.dll", "vcrun2019"),
    ("vcruntime150.dll", "vcrun2022"),
    ("msvcp150.dll", "vcrun2022"),
    ("vcomp150.dll", "vcrun2022"),
    ("msvcp60.dll", "vcrun6"),
    ("msvcrt.dll", "vcrun6"),
    ("msvcp71.dll", "vcrun2003"),
    ("msvcp80.dll", "vcrun2005"),
    ("msvcp90.dll", "vcrun2008"),
    ("msvcp100.dll", "vcrun2010"),
    ("msvcp110.dll", "vcrun2012"),
    ("msvcp120.dll", "vcrun2013"),
    // System libraries & fonts
    ("mfc42.dll", "mfc42"),
    ("msxml3.dll", "msxml3"),
    ("msxml6.dll", "msxml6"),
    ("quartz.dll", "quartz"),
    ("riched20.dll", "riched20"),
    ("tahoma.ttf", "tahoma"),
    ("arial.ttf", "corefonts"),
    ("winhttp.dll", "winhttp"),
    ("wininet.dll", "wininet"),
    ("wsock32.dll", "wsock32"),
    ("iphlpapi.dll", "iphlpapi"),
];

/// Components installed through the environment CLI instead of winetricks.
const ENVIRONMENT_CLI_COMPONENTS: &[&str] = &["dxvk", "vkd3d", "dxvk-nvapi"];

/// Look up the component satisfying a DLL, ignoring case.
pub fn map_dll(dll: &str) -> Option<&'static str> {
    let needle = dll.trim().to_ascii_lowercase();
    COMPONENT_TABLE
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, component)| *component)
}

/// Distinct component identifiers present in the table, sorted.
pub fn component_values() -> Vec<&'static str> {
    let mut values: Vec<&'static str> = COMPONENT_TABLE.iter().map(|(_, c)| *c).collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// Which tool installs a given component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallRoute {
    /// Managed by the Bottles CLI (graphics translation layers).
    EnvironmentCli,
    /// Installed as a winetricks verb.
    DependencyInstaller,
}

/// Route a component to its installer.
pub fn install_route(component: &str) -> InstallRoute {
    if ENVIRONMENT_CLI_COMPONENTS.contains(&component) {
        InstallRoute::EnvironmentCli
    } else {
        InstallRoute::DependencyInstaller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_dll_is_case_insensitive() {
        assert_eq!(map_dll("d3d11.dll"), Some("dxvk"));
        assert_eq!(map_dll("D3D11.DLL"), Some("dxvk"));
        assert_eq!(map_dll("D3d11.Dll"), Some("dxvk"));
    }

    #[test]
    fn test_map_dll_unknown_is_none() {
        assert_eq!(map_dll("kernel32.dll"), None);
        assert_eq!(map_dll(""), None);
    }

    #[test]
    fn test_every_key_is_lowercase_and_unique() {
        let mut keys: Vec<&str> = COMPONENT_TABLE.iter().map(|(k, _)| *k).collect();
        for key in &keys {
            assert_eq!(*key, key.to_ascii_lowercase());
        }
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total, "duplicate DLL keys in table");
    }

    #[test]
    fn test_every_mapping_lands_in_value_set() {
        let values = component_values();
        for (dll, _) in COMPONENT_TABLE {
            let mapped = map_dll(dll).unwrap();
            assert!(values.contains(&mapped));
        }
    }

    #[test]
    fn test_install_route() {
        assert_eq!(install_route("dxvk"), InstallRoute::EnvironmentCli);
        assert_eq!(install_route("dxvk-nvapi"), InstallRoute::EnvironmentCli);
        assert_eq!(install_route("vcrun2019"), InstallRoute::DependencyInstaller);
    }
}
