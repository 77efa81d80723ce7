use serde::Serialize;

/// Process-lifetime static example movies shown before the first search.
/// Read-only after initialization.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeedMovie {
    pub title: &'static str,
    pub img: &'static str,
    pub year: &'static str,
    pub genre: &'static str,
    pub rating: &'static str,
    pub description: &'static str,
}

pub const SEED_MOVIES: &[SeedMovie] = &[
    SeedMovie {
        title: "Jersey",
        img: "https://th.bing.com/th/id/OIP.dB2OP_Cyf13lf7DRiD_WfAHaKX?w=208&h=291&c=7&r=0&o=5&dpr=1.3&pid=1.7",
        year: "2019",
        genre: "Drama/Sport",
        rating: "7.5",
        description: "A talented but failed cricketer decides to return to cricket in his late thirties driven by the desire to represent the Indian cricket team and fulfill his son's wish for a jersey as a gift.",
    },
    SeedMovie {
        title: "Seetharamam",
        img: "https://image.tmdb.org/t/p/w500/vvxXO0TekcEa7hnXo2qCgB3U3e2.jpg",
        year: "2022",
        genre: "Romance/Drama",
        rating: "7.5",
        description: "A romantic tale exploring love, destiny and the importance of staying true to one's roots.",
    },
    SeedMovie {
        title: "12th Fail",
        img: "https://img.rgstatic.com/content/movie/ccdfc6df-ad1d-4500-a935-b447995b6a3c/poster-500.jpg",
        year: "2023",
        genre: "Drama/Biography",
        rating: "7.5",
        description: "Based on a true story, follows an aspiring IPS officer's journey as he overcomes failures to achieve his dreams.",
    },
    SeedMovie {
        title: "Gifted",
        img: "https://tiffanyyong.com/wp-content/uploads/2017/04/Gifted-SG-Poster.jpg",
        year: "2017",
        genre: "Drama",
        rating: "7.5",
        description: "Frank, a single man raising his child prodigy niece Mary, gets into a custody battle with his mother over the young girl's future.",
    },
    SeedMovie {
        title: "Dangal",
        img: "https://m.media-amazon.com/images/M/MV5BMTQ4MzQzMzM2Nl5BMl5BanBnXkFtZTgwMTQ1NzU3MDI@._V1_.jpg",
        year: "2016",
        genre: "Drama/Sport",
        rating: "7.5",
        description: "Former wrestler Mahavir Singh Phogat trains his daughters Geeta and Babita to become India's first world-class female wrestlers.",
    },
];

/// Capitalizes each word of a title, splitting on whitespace and colons
pub fn title_case(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
