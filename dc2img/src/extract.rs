use std::path::{Path, PathBuf};

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::models::{
    DiscordAttachment, DiscordEmbed, DiscordMessage, ImageCandidate, ImageSource,
};

const IMAGE_MIME_PREFIX: &str = "image/";

pub fn is_image_attachment(attachment: &DiscordAttachment) -> bool {
    attachment
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.starts_with(IMAGE_MIME_PREFIX))
}

pub fn embed_image_url(embed: &DiscordEmbed) -> Option<&str> {
    embed
        .image
        .as_ref()
        .and_then(|image| image.url.as_deref())
        .filter(|url| !url.is_empty())
}

/// `<random hex token>_<unix timestamp><extension>`, the extension keeping its dot.
pub fn unique_file_name(extension: &str) -> String {
    format!(
        "{}_{}{}",
        Uuid::new_v4().simple(),
        Utc::now().timestamp(),
        extension
    )
}

/// Extension of the last path component including the leading dot, or an
/// empty string. A leading dot alone (".bashrc") is not an extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Extension of the final path segment of `url`, ignoring query and fragment.
pub fn url_extension(url: &str) -> String {
    let last_segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    file_extension(&last_segment)
}

/// Every image in `message` paired with a fresh file name under `output_dir`:
/// attachments first, then embeds, each in message order.
pub fn extract_images(message: &DiscordMessage, output_dir: &Path) -> Vec<ImageCandidate> {
    let attachments = message
        .attachments
        .iter()
        .filter(|attachment| is_image_attachment(attachment))
        .map(|attachment| ImageCandidate {
            source: ImageSource::Attachment,
            url: attachment.url.clone(),
            destination: destination(output_dir, &file_extension(&attachment.filename)),
        });

    let embeds = message
        .embeds
        .iter()
        .filter_map(embed_image_url)
        .map(|url| ImageCandidate {
            source: ImageSource::Embed,
            url: url.to_string(),
            destination: destination(output_dir, &url_extension(url)),
        });

    attachments.chain(embeds).collect()
}

fn destination(output_dir: &Path, extension: &str) -> PathBuf {
    output_dir.join(unique_file_name(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::tests::message;
    use crate::models::discord::EmbedImage;
    use std::collections::HashSet;

    fn attachment(filename: &str, content_type: Option<&str>) -> DiscordAttachment {
        DiscordAttachment {
            filename: filename.to_string(),
            url: format!("https://cdn.example.com/attachments/{filename}"),
            content_type: content_type.map(str::to_string),
        }
    }

    fn embed(url: Option<&str>) -> DiscordEmbed {
        DiscordEmbed {
            image: Some(EmbedImage {
                url: url.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_is_image_attachment() {
        assert!(is_image_attachment(&attachment("a.png", Some("image/png"))));
        assert!(is_image_attachment(&attachment("a.gif", Some("image/gif"))));
        assert!(!is_image_attachment(&attachment("a.txt", Some("text/plain"))));
        assert!(!is_image_attachment(&attachment("a.mp4", Some("video/mp4"))));
        assert!(!is_image_attachment(&attachment("a.png", None)));
    }

    #[test]
    fn test_embed_image_url() {
        assert_eq!(
            embed_image_url(&embed(Some("https://x.test/a.jpg"))),
            Some("https://x.test/a.jpg")
        );
        assert_eq!(embed_image_url(&embed(Some(""))), None);
        assert_eq!(embed_image_url(&embed(None)), None);
        assert_eq!(embed_image_url(&DiscordEmbed::default()), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cat.png"), ".png");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".hidden"), "");
    }

    #[test]
    fn test_url_extension_ignores_query() {
        assert_eq!(
            url_extension("https://media.example.com/images/meme.jpg?width=400&height=300"),
            ".jpg"
        );
        assert_eq!(url_extension("https://media.example.com/images/meme.webp#top"), ".webp");
        assert_eq!(url_extension("https://media.example.com/images/"), "");
        assert_eq!(url_extension("not a url/photo.png?x=1"), ".png");
    }

    #[test]
    fn test_unique_file_name_shape() {
        let name = unique_file_name(".png");
        let (token, rest) = name.split_once('_').unwrap();
        let timestamp = rest.strip_suffix(".png").unwrap();

        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(timestamp.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_unique_file_names_do_not_collide() {
        let names: HashSet<_> = (0..1000).map(|_| unique_file_name(".png")).collect();
        assert_eq!(names.len(), 1000);
    }

    #[test]
    fn test_extract_images_orders_attachments_before_embeds() {
        let mut msg = message(1, 7);
        msg.embeds = vec![embed(Some("https://x.test/e1.gif")), embed(None)];
        msg.attachments = vec![
            attachment("a1.png", Some("image/png")),
            attachment("notes.txt", Some("text/plain")),
            attachment("a2.jpeg", Some("image/jpeg")),
        ];

        let candidates = extract_images(&msg, Path::new("images"));

        let summary: Vec<_> = candidates
            .iter()
            .map(|c| (c.source, c.destination.extension().unwrap().to_str().unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ImageSource::Attachment, "png"),
                (ImageSource::Attachment, "jpeg"),
                (ImageSource::Embed, "gif"),
            ]
        );
        assert!(candidates.iter().all(|c| c.destination.starts_with("images")));
        assert_eq!(candidates[2].url, "https://x.test/e1.gif");
    }

    #[test]
    fn test_extract_images_without_images_is_empty() {
        let mut msg = message(1, 7);
        msg.attachments = vec![attachment("notes.txt", Some("text/plain"))];
        msg.embeds = vec![DiscordEmbed::default()];

        assert!(extract_images(&msg, Path::new("images")).is_empty());
    }
}
