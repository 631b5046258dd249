//! The eight trigrams and uniform selection among them.

use crate::models::Hexagram;
use rand::seq::SliceRandom;
use rand::Rng;

pub static HEXAGRAMS: [Hexagram; 8] = [
    Hexagram {
        symbol: "☰",
        name: "Càn",
        meaning: "Trời",
        description: "Sức mạnh sáng tạo, khởi đầu tốt lành. Thời điểm thuận lợi để bắt đầu những dự án mới.",
    },
    Hexagram {
        symbol: "☷",
        name: "Khôn",
        meaning: "Đất",
        description: "Khả năng tiếp nhận và nuôi dưỡng. Cần kiên nhẫn và bao dung trong giai đoạn này.",
    },
    Hexagram {
        symbol: "☳",
        name: "Chấn",
        meaning: "Sấm",
        description: "Sự thức tỉnh và khởi động. Có thể có những thay đổi đột ngột nhưng tích cực.",
    },
    Hexagram {
        symbol: "☵",
        name: "Khảm",
        meaning: "Nước",
        description: "Khó khăn và thử thách. Cần thận trọng và kiên định để vượt qua.",
    },
    Hexagram {
        symbol: "☶",
        name: "Cấn",
        meaning: "Núi",
        description: "Sự dừng lại và suy ngẫm. Thời điểm thích hợp để nghỉ ngơi và tích lũy sức lực.",
    },
    Hexagram {
        symbol: "☴",
        name: "Tốn",
        meaning: "Gió",
        description: "Sự lan tỏa và phát triển từ từ. Ảnh hưởng tích cực sẽ lan rộng.",
    },
    Hexagram {
        symbol: "☲",
        name: "Ly",
        meaning: "Lửa",
        description: "Sự sáng tỏ và thông minh. Thời kỳ thuận lợi cho học tập và sáng tạo.",
    },
    Hexagram {
        symbol: "☱",
        name: "Đoài",
        meaning: "Hồ",
        description: "Niềm vui và hài hòa. Giai đoạn tốt cho các mối quan hệ và giao tiếp.",
    },
];

/// Draw a trigram using the thread-local RNG.
pub fn select_random() -> &'static Hexagram {
    select_with(&mut rand::thread_rng())
}

/// Draw a trigram from the given RNG.
pub fn select_with<R: Rng + ?Sized>(rng: &mut R) -> &'static Hexagram {
    // The slice is non-empty, so `choose` always yields.
    HEXAGRAMS.choose(rng).unwrap_or(&HEXAGRAMS[0])
}
