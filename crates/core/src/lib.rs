pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod overlay;
}

pub mod detection {
    pub mod domain {
        pub mod detection_backend;
        pub mod face_detector;
        pub mod face_locator;
    }
    pub mod infrastructure;
}

pub mod compositing {
    pub mod domain {
        pub mod frame_compositor;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod box_filter;
    pub mod pipeline_logger;
    pub mod stamp_image_use_case;
}
