//! Sample catalog loaded into an empty database.

pub(crate) struct SampleAlbum {
    pub genre: &'static str,
    pub artist: &'static str,
    pub title: &'static str,
    pub price: i64,
}

pub(crate) const GENRES: &[(&str, &str)] = &[
    ("Rock", "Rock and Roll is a form of rock music developed in the 1950s and 1960s"),
    ("Jazz", "Jazz is a type of music which originated in the United States"),
    ("Metal", "Heavy Metal is a loud, aggressive style of Rock music"),
    ("Alternative", "Alternative rock is a genre that emerged from the independent music underground"),
    ("Disco", "Disco is a style of pop music that was popular in the mid-1970s"),
    ("Blues", "The blues is a genre and musical form that originated in African-American communities"),
    ("Latin", "Latin American music is the music of all countries in Latin America"),
    ("Reggae", "Reggae is a music genre first developed in Jamaica in the late 1960s"),
    ("Pop", "Pop music is a music genre that developed from the 1950s"),
    ("Classical", "Classical music is a very general term for the art music of the West"),
];

const fn album(genre: &'static str, artist: &'static str, title: &'static str, price: i64) -> SampleAlbum {
    SampleAlbum {
        genre,
        artist,
        title,
        price,
    }
}

pub(crate) const ALBUMS: &[SampleAlbum] = &[
    album("Rock", "AC/DC", "For Those About To Rock We Salute You", 899),
    album("Rock", "Aerosmith", "Big Ones", 899),
    album("Rock", "Led Zeppelin", "Led Zeppelin IV", 899),
    album("Rock", "The Rolling Stones", "Hot Rocks, 1964-1971", 899),
    album("Jazz", "Miles Davis", "Kind of Blue", 999),
    album("Jazz", "John Coltrane", "A Love Supreme", 899),
    album("Metal", "Metallica", "Master Of Puppets", 899),
    album("Metal", "Black Sabbath", "Paranoid", 899),
    album("Metal", "Iron Maiden", "The Number of the Beast", 899),
    album("Alternative", "Nirvana", "Nevermind", 899),
    album("Alternative", "R.E.M.", "Automatic for the People", 899),
    album("Disco", "Bee Gees", "Saturday Night Fever", 899),
    album("Blues", "Eric Clapton", "Unplugged", 899),
    album("Blues", "B.B. King", "Live at the Regal", 899),
    album("Latin", "Santana", "Supernatural", 899),
    album("Reggae", "Bob Marley", "Legend", 899),
    album("Pop", "Madonna", "Ray of Light", 899),
    album("Pop", "Michael Jackson", "Thriller", 999),
    album("Classical", "Berliner Philharmoniker & Herbert Von Karajan", "Beethoven: Symphonies 5 & 7", 1199),
];

/// Placeholder art used for every sample album.
pub(crate) const ALBUM_ART_URL: &str = "/images/placeholder.gif";
