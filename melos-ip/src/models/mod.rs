//! Data model for the melos IP registration service

pub mod derivative;
pub mod ip_asset;
pub mod media;
pub mod metadata;
pub mod verification;

pub use derivative::{DerivativeLink, RevenueClaim};
pub use ip_asset::{
    Creator, GatingPolicy, IpAsset, LicenseFlavor, LicenseTermsParams, RegisteredAsset,
};
pub use media::{FetchStatus, MediaItem, TrustReason};
pub use metadata::AssetMetadata;
pub use verification::{
    BrandAuthorization, ExternalInfringement, InNetworkInfringement, InfringementResult,
    InfringementStatus, LicenseParent, MediaStatus, RegistrationTx, SubmitAck,
    VerificationOutcome, VerificationRequest, VerificationResult,
};
