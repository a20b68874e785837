//! Stream url construction, including signature deciphering

use crate::core::context::ResolverContext;
use crate::error::ParserError;
use crate::platform::cipher::CipherProgram;
use crate::platform::extractor::extract;
use crate::platform::formats::RawFormat;
use crate::utils::url::parse_query;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Decoded `signatureCipher` blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCipher {
    pub url: String,
    /// Scrambled signature
    pub s: Option<String>,
    /// Plain signature
    pub sig: Option<String>,
    /// Query parameter the signature goes under
    pub sp: String,
}

impl SignatureCipher {
    pub fn parse(blob: &str) -> Result<Self, ParserError> {
        let mut fields = parse_query(blob);
        let url = fields
            .remove("url")
            .ok_or_else(|| ParserError::InvalidResponse("cipher blob without url".to_string()))?;
        Ok(Self {
            url,
            s: fields.remove("s").filter(|s| !s.is_empty()),
            sig: fields.remove("sig").filter(|s| !s.is_empty()),
            sp: fields
                .remove("sp")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "signature".to_string()),
        })
    }
}

/// Source of the cipher program for the current player
#[async_trait]
pub trait CipherProvider: Send + Sync {
    async fn program(&self) -> Result<Arc<CipherProgram>, ParserError>;
}

/// Derives programs from the player script of one asset version,
/// reusing the process-wide program cache.
pub struct ScriptCipher<'a> {
    ctx: &'a ResolverContext,
    asset_version: Option<&'a str>,
}

impl<'a> ScriptCipher<'a> {
    pub fn new(ctx: &'a ResolverContext, asset_version: Option<&'a str>) -> Self {
        Self { ctx, asset_version }
    }
}

#[async_trait]
impl CipherProvider for ScriptCipher<'_> {
    async fn program(&self) -> Result<Arc<CipherProgram>, ParserError> {
        let version = self.asset_version.ok_or(ParserError::MissingAssetVersion)?;
        let players = self.ctx.players();
        if let Some(program) = players.cached_program(version).await {
            return Ok(program);
        }

        let script_url = format!("{}{}", self.ctx.options().endpoints.base_url, version);
        debug!("Fetching player script {}", script_url);
        let script = self.ctx.fetch_text_cached(&script_url).await?;
        let program = Arc::new(extract(&script)?);
        players.store_program(version, program.clone()).await;
        Ok(program)
    }
}

/// Build the playable url of `format`
pub async fn build_url(
    format: &RawFormat,
    ciphers: &dyn CipherProvider,
) -> Result<String, ParserError> {
    if let Some(url) = &format.url {
        return Ok(url.clone());
    }

    let blob = format
        .cipher_blob()
        .ok_or_else(|| ParserError::Unsignable(format.tag()))?;
    let cipher = SignatureCipher::parse(blob)?;

    let signature = if let Some(scrambled) = &cipher.s {
        ciphers.program().await?.apply(scrambled)
    } else if let Some(plain) = cipher.sig {
        plain
    } else {
        return Err(ParserError::Unsignable(format.tag()));
    };

    Ok(format!("{}&{}={}", cipher.url, cipher.sp, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ResolverOptions;
    use crate::platform::cipher::Transform;
    use crate::platform::client::MockTransport;
    use crate::platform::extractor::tests::PLAYER_SCRIPT;

    struct FixedCipher(Arc<CipherProgram>);

    #[async_trait]
    impl CipherProvider for FixedCipher {
        async fn program(&self) -> Result<Arc<CipherProgram>, ParserError> {
            Ok(self.0.clone())
        }
    }

    fn reverse() -> FixedCipher {
        FixedCipher(Arc::new(CipherProgram::new(vec![Transform::Reverse]).unwrap()))
    }

    #[test]
    fn test_parse_cipher_blob() {
        let cipher = SignatureCipher::parse(
            "s=abc%3D&sp=sig&url=https%3A%2F%2Fr1.example%2Fvideoplayback%3Fitag%3D22",
        )
        .unwrap();
        assert_eq!(cipher.url, "https://r1.example/videoplayback?itag=22");
        assert_eq!(cipher.s.as_deref(), Some("abc="));
        assert_eq!(cipher.sp, "sig");

        let cipher = SignatureCipher::parse("sig=plain&url=https%3A%2F%2Fx").unwrap();
        assert_eq!(cipher.sp, "signature");
        assert!(SignatureCipher::parse("s=abc").is_err());
    }

    #[tokio::test]
    async fn test_ready_url_unchanged() {
        let format = RawFormat {
            itag: 18,
            url: Some("https://r1.example/18".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_url(&format, &reverse()).await.unwrap(),
            "https://r1.example/18"
        );
    }

    #[tokio::test]
    async fn test_scrambled_and_plain_signatures() {
        let scrambled = RawFormat {
            itag: 22,
            signature_cipher: Some("s=abc&sp=sig&url=https%3A%2F%2Fr1.example%2Fv%3Fa%3D1".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_url(&scrambled, &reverse()).await.unwrap(),
            "https://r1.example/v?a=1&sig=cba"
        );

        let plain = RawFormat {
            itag: 43,
            cipher: Some("sig=xyz&url=https%3A%2F%2Fr1.example%2Fv".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_url(&plain, &reverse()).await.unwrap(),
            "https://r1.example/v&signature=xyz"
        );
    }

    #[tokio::test]
    async fn test_unsignable() {
        let bare = RawFormat {
            itag: 5,
            ..Default::default()
        };
        assert!(matches!(
            build_url(&bare, &reverse()).await,
            Err(ParserError::Unsignable(tag)) if tag == "5"
        ));

        let no_signature = RawFormat {
            itag: 6,
            signature_cipher: Some("url=https%3A%2F%2Fr1.example%2Fv".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_url(&no_signature, &reverse()).await,
            Err(ParserError::Unsignable(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_asset_version() {
        let ctx = ResolverContext::new(Arc::new(MockTransport::new()), ResolverOptions::default());
        let format = RawFormat {
            itag: 22,
            signature_cipher: Some("s=abc&url=https%3A%2F%2Fr1.example%2Fv".to_string()),
            ..Default::default()
        };
        let result = build_url(&format, &ScriptCipher::new(&ctx, None)).await;
        assert!(matches!(result, Err(ParserError::MissingAssetVersion)));
    }

    #[tokio::test]
    async fn test_script_cipher_fetches_once() {
        let script_url = "https://www.youtube.com/s/player/abc/base.js";
        let transport = Arc::new(MockTransport::new().with_get(script_url, PLAYER_SCRIPT));
        let ctx = ResolverContext::new(transport.clone(), ResolverOptions::default());
        let provider = ScriptCipher::new(&ctx, Some("/s/player/abc/base.js"));

        let first = provider.program().await.unwrap();
        let second = provider.program().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.apply("abcdef"), "edabc");
        assert_eq!(transport.count(script_url), 1);
    }
}
