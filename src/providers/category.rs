//! Classificação de software por palavras-chave.

use serde::{Deserialize, Serialize};

/// Taxonomia de categorias de software.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SoftwareCategory {
    #[serde(rename = "File Sharing")]
    FileSharing,
    #[serde(rename = "GenAI Tool")]
    GenAiTool,
    #[serde(rename = "SaaS CRM")]
    SaasCrm,
    #[serde(rename = "Endpoint Agent")]
    EndpointAgent,
    #[serde(rename = "Password Manager")]
    PasswordManager,
    #[serde(rename = "Compression Utility")]
    CompressionUtility,
    #[serde(rename = "Remote Access")]
    RemoteAccess,
    #[serde(rename = "Development Tool")]
    DevelopmentTool,
    #[serde(rename = "Communication")]
    Communication,
    #[serde(rename = "Security Tool")]
    SecurityTool,
    #[serde(rename = "Media Player")]
    MediaPlayer,
    #[serde(rename = "Virtualization")]
    Virtualization,
    #[serde(rename = "Office Suite")]
    OfficeSuite,
    #[serde(rename = "Gaming")]
    Gaming,
    #[serde(rename = "Backup/Storage")]
    BackupStorage,
    #[serde(rename = "Browser")]
    Browser,
    #[serde(rename = "Other")]
    Other,
}

impl std::fmt::Display for SoftwareCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SoftwareCategory::FileSharing => "File Sharing",
            SoftwareCategory::GenAiTool => "GenAI Tool",
            SoftwareCategory::SaasCrm => "SaaS CRM",
            SoftwareCategory::EndpointAgent => "Endpoint Agent",
            SoftwareCategory::PasswordManager => "Password Manager",
            SoftwareCategory::CompressionUtility => "Compression Utility",
            SoftwareCategory::RemoteAccess => "Remote Access",
            SoftwareCategory::DevelopmentTool => "Development Tool",
            SoftwareCategory::Communication => "Communication",
            SoftwareCategory::SecurityTool => "Security Tool",
            SoftwareCategory::MediaPlayer => "Media Player",
            SoftwareCategory::Virtualization => "Virtualization",
            SoftwareCategory::OfficeSuite => "Office Suite",
            SoftwareCategory::Gaming => "Gaming",
            SoftwareCategory::BackupStorage => "Backup/Storage",
            SoftwareCategory::Browser => "Browser",
            SoftwareCategory::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

// A ordem importa: a primeira categoria com termo presente vence.
const KEYWORDS: &[(SoftwareCategory, &[&str])] = &[
    (
        SoftwareCategory::PasswordManager,
        &["password", "keepass", "1password", "lastpass", "dashlane"],
    ),
    (
        SoftwareCategory::CompressionUtility,
        &["zip", "7-zip", "winrar", "peazip", "bandizip"],
    ),
    (SoftwareCategory::FileSharing, &["filezilla", "ftp", "winscp"]),
    (
        SoftwareCategory::RemoteAccess,
        &["teamviewer", "anydesk", "vnc", "rdp", "supremo", "ammyy"],
    ),
    (
        SoftwareCategory::Communication,
        &["slack", "skype", "zoom", "discord", "teams"],
    ),
    (
        SoftwareCategory::DevelopmentTool,
        &["git", "postman", "insomnia", "atom", "ultraedit"],
    ),
    (
        SoftwareCategory::SecurityTool,
        &[
            "malwarebytes",
            "hitmanpro",
            "antispyware",
            "veracrypt",
            "bitlocker",
            "cryptomator",
        ],
    ),
    (
        SoftwareCategory::MediaPlayer,
        &["vlc", "gom", "potplayer", "wavpad"],
    ),
    (
        SoftwareCategory::Virtualization,
        &["virtualbox", "vmware", "qemu"],
    ),
    (SoftwareCategory::OfficeSuite, &["office", "wps", "docuworks"]),
    (
        SoftwareCategory::Gaming,
        &["steam", "origin", "ubisoft", "gog", "riot", "plarium"],
    ),
    (
        SoftwareCategory::BackupStorage,
        &["dropbox", "onedrive", "backup"],
    ),
    (
        SoftwareCategory::Browser,
        &["chrome", "firefox", "edge", "tor browser"],
    ),
];

/// Classifica um produto pelo nome.
pub fn classify(product_name: &str) -> SoftwareCategory {
    let name = product_name.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, terms)| terms.iter().any(|term| name.contains(term)))
        .map(|(category, _)| *category)
        .unwrap_or(SoftwareCategory::Other)
}
